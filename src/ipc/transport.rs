//! Transport primitives and the Unix socket implementation

use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_net::unix::UnixStream;
use executor_core::{Executor, Task};
use smol::channel::{self, Sender};

use crate::config::TransportConfig;
use crate::ipc::protocol::{
    FrameKind, IpcError, IpcRequest, IpcResponse, encode, read_frame, read_frame_blocking,
    write_frames,
};

/// The three delivery primitives the typed layer is built on
///
/// Payloads are MessagePack-encoded argument tuples; the transport never
/// looks inside them.
pub trait Transport: Send + Sync + 'static {
    /// Fire-and-forget. Delivery failures are not reported to the caller.
    fn notify(&self, channel: &str, payload: Vec<u8>);

    /// Send a request and wait for the correlated reply
    fn request(
        &self,
        channel: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, IpcError>> + Send;

    /// Send a message with no arguments and halt the calling thread until
    /// the host acknowledges it
    fn blocking_call(&self, channel: &str) -> Result<Vec<u8>, IpcError>;
}

/// Outstanding requests by id; `None` once the connection is gone
type Pending = Arc<Mutex<Option<HashMap<u32, Sender<IpcResponse>>>>>;

/// Front-end side of the host connection over a Unix domain socket
///
/// Dropping the transport flushes queued notifications and then closes the
/// connection; the host sees the end of stream and releases its side.
pub struct SocketTransport {
    outbound: Sender<Vec<u8>>,
    pending: Pending,
    next_id: AtomicU32,
    socket_path: PathBuf,
    max_frame_len: usize,
}

impl SocketTransport {
    /// Connect to the host and start the reader and writer tasks
    ///
    /// # Arguments
    /// * `config` - Socket path and frame limit
    /// * `executor` - Executor to spawn the connection tasks on
    pub async fn connect<E: Executor + Clone + 'static>(
        config: &TransportConfig,
        executor: E,
    ) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(config.socket_path()).await?;
        let (outbound, frames) = channel::unbounded();
        let pending: Pending = Arc::new(Mutex::new(Some(HashMap::new())));

        executor.spawn(write_frames(stream.clone(), frames)).detach();
        executor
            .spawn(read_responses(
                stream,
                Arc::clone(&pending),
                config.max_frame_len(),
            ))
            .detach();

        tracing::info!(path = %config.socket_path().display(), "connected to host");

        Ok(Self {
            outbound,
            pending,
            // zero is reserved for notifications
            next_id: AtomicU32::new(1),
            socket_path: config.socket_path().to_path_buf(),
            max_frame_len: config.max_frame_len(),
        })
    }

    fn register(&self, id: u32) -> Result<channel::Receiver<IpcResponse>, IpcError> {
        let (tx, rx) = channel::bounded(1);
        let mut guard = self.pending.lock().map_err(|_| IpcError::Disconnected)?;
        guard
            .as_mut()
            .ok_or(IpcError::Disconnected)?
            .insert(id, tx);
        Ok(rx)
    }

    fn forget(&self, id: u32) {
        if let Ok(mut guard) = self.pending.lock() {
            if let Some(pending) = guard.as_mut() {
                pending.remove(&id);
            }
        }
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        // the writer drains what is queued, then shuts the stream down
        self.outbound.close();
    }
}

impl Transport for SocketTransport {
    fn notify(&self, channel: &str, payload: Vec<u8>) {
        let request = IpcRequest::new(FrameKind::Notify, 0, channel, payload);
        let frame = match request.to_frame(self.max_frame_len) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(channel, error = %e, "failed to frame notification");
                return;
            }
        };

        if self.outbound.try_send(frame).is_err() {
            tracing::warn!(channel, "host disconnected, dropping notification");
        }
    }

    async fn request(&self, channel: &str, payload: Vec<u8>) -> Result<Vec<u8>, IpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame =
            IpcRequest::new(FrameKind::Request, id, channel, payload).to_frame(self.max_frame_len)?;
        let reply = self.register(id)?;

        if self.outbound.try_send(frame).is_err() {
            self.forget(id);
            return Err(IpcError::Disconnected);
        }
        tracing::trace!(channel, id, "request sent");

        let response = reply.recv().await.map_err(|_| IpcError::Disconnected)?;
        response.into_result()
    }

    fn blocking_call(&self, channel: &str) -> Result<Vec<u8>, IpcError> {
        let frame = IpcRequest::new(FrameKind::Blocking, 0, channel, encode(&())?)
            .to_frame(self.max_frame_len)?;
        let mut stream = std::os::unix::net::UnixStream::connect(&self.socket_path)?;
        stream.write_all(&frame)?;

        let body =
            read_frame_blocking(&mut stream, self.max_frame_len)?.ok_or(IpcError::Disconnected)?;
        tracing::debug!(channel, "blocking call acknowledged");
        IpcResponse::from_bytes(&body)?.into_result()
    }
}

/// Fulfil pending requests until the host closes the connection
async fn read_responses(mut stream: UnixStream, pending: Pending, max_frame_len: usize) {
    loop {
        let body = match read_frame(&mut stream, max_frame_len).await {
            Ok(Some(body)) => body,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read response");
                break;
            }
        };

        let response = match IpcResponse::from_bytes(&body) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse response");
                break;
            }
        };

        let waiter = pending
            .lock()
            .ok()
            .and_then(|mut guard| guard.as_mut().and_then(|p| p.remove(&response.id)));
        match waiter {
            Some(tx) => {
                let _ = tx.try_send(response);
            }
            None => tracing::debug!(id = response.id, "response for unknown request"),
        }
    }

    tracing::debug!("host connection closed");
    // Dropping the senders fails every outstanding request
    if let Ok(mut guard) = pending.lock() {
        guard.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::protocol::DEFAULT_MAX_FRAME_LEN;
    use async_net::unix::UnixListener;
    use executor_core::tokio::TokioGlobal;
    use std::time::Duration;

    fn socket_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tether-transport-{}-{name}.sock", std::process::id()))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_drop_flushes_then_closes_connection() {
        let path = socket_path("drop");
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();
        let config = TransportConfig::new(&path);

        let transport = SocketTransport::connect(&config, TokioGlobal).await.unwrap();
        let (mut host_side, _) = listener.accept().await.unwrap();
        transport.notify("renderer-ready", encode(&()).unwrap());
        drop(transport);

        let frames = tokio::time::timeout(Duration::from_secs(5), async {
            let first = read_frame(&mut host_side, DEFAULT_MAX_FRAME_LEN).await.unwrap();
            let second = read_frame(&mut host_side, DEFAULT_MAX_FRAME_LEN).await.unwrap();
            (first, second)
        })
        .await
        .expect("host connection still open after drop");

        let body = frames.0.unwrap();
        assert_eq!(IpcRequest::from_bytes(&body).unwrap().channel, "renderer-ready");
        assert!(frames.1.is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_oversize_frames_are_refused_locally() {
        let path = socket_path("oversize");
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();
        let config = TransportConfig::builder(&path).max_frame_len(64).build();

        let transport = SocketTransport::connect(&config, TokioGlobal).await.unwrap();
        let (mut host_side, _) = listener.accept().await.unwrap();

        let big = encode(&("x".repeat(256),)).unwrap();
        let err = transport.request("resolve-proxy", big.clone()).await.unwrap_err();
        assert!(matches!(err, IpcError::FrameTooLarge(_)));
        let err = transport.blocking_call(&"w".repeat(80)).unwrap_err();
        assert!(matches!(err, IpcError::FrameTooLarge(_)));
        transport.notify("send-error-report", big);
        transport.notify("renderer-ready", encode(&()).unwrap());

        // only the frame that fits reached the host
        let body = tokio::time::timeout(
            Duration::from_secs(5),
            read_frame(&mut host_side, DEFAULT_MAX_FRAME_LEN),
        )
        .await
        .unwrap()
        .unwrap()
        .unwrap();
        assert_eq!(IpcRequest::from_bytes(&body).unwrap().channel, "renderer-ready");
        let _ = std::fs::remove_file(&path);
    }
}
