//! IPC server implementation
//!
//! Unix domain socket server for handling channel messages from the
//! sandboxed front-end.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_net::unix::{UnixListener, UnixStream};
use executor_core::{Executor, Task};
use smol::channel::{self, Sender};

use crate::config::TransportConfig;
use crate::ipc::protocol::{
    FrameKind, IpcError, IpcRequest, IpcResponse, read_frame, write_frames,
};
use crate::ipc::router::HostRouter;

/// IPC server that listens on a Unix domain socket
pub struct IpcServer {
    socket_path: PathBuf,
    running: Arc<AtomicBool>,
}

impl IpcServer {
    /// Create and start a new IPC server
    ///
    /// # Arguments
    /// * `router` - The router to dispatch incoming messages
    /// * `config` - Socket path and frame limit
    /// * `executor` - Executor to spawn the server tasks on
    pub async fn new<E: Executor + Clone + 'static>(
        router: HostRouter,
        config: &TransportConfig,
        executor: E,
    ) -> Result<Self, IpcError> {
        let socket_path = config.socket_path().to_path_buf();
        let router = Arc::new(router);
        let running = Arc::new(AtomicBool::new(true));

        // Remove existing socket file if present
        let _ = std::fs::remove_file(&socket_path);

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&socket_path)?;

        tracing::info!(path = %socket_path.display(), "IPC server started");

        executor
            .spawn(run_server(
                listener,
                router,
                Arc::clone(&running),
                config.max_frame_len(),
                executor.clone(),
            ))
            .detach();

        Ok(Self {
            socket_path,
            running,
        })
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Stop accepting new connections
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        tracing::debug!(path = %self.socket_path.display(), "IPC server stopping");
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.stop();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Main server accept loop
async fn run_server<E: Executor + Clone + 'static>(
    listener: UnixListener,
    router: Arc<HostRouter>,
    running: Arc<AtomicBool>,
    max_frame_len: usize,
    executor: E,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let router = Arc::clone(&router);
                executor
                    .spawn(handle_connection(
                        stream,
                        router,
                        max_frame_len,
                        executor.clone(),
                    ))
                    .detach();
            }
            Err(e) => {
                if running.load(Ordering::SeqCst) {
                    tracing::warn!(error = %e, "failed to accept IPC connection");
                }
            }
        }
    }
}

/// Handle a single connection
///
/// Notifications and blocking calls are handled inline, in arrival order.
/// Requests run concurrently and reply by id whenever they finish.
async fn handle_connection<E: Executor + Clone + 'static>(
    mut stream: UnixStream,
    router: Arc<HostRouter>,
    max_frame_len: usize,
    executor: E,
) {
    let (responses, frames) = channel::unbounded();
    executor.spawn(write_frames(stream.clone(), frames)).detach();

    loop {
        let body = match read_frame(&mut stream, max_frame_len).await {
            Ok(Some(body)) => body,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read IPC frame");
                break;
            }
        };

        let request = match IpcRequest::from_bytes(&body) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse IPC request");
                break;
            }
        };

        tracing::debug!(channel = %request.channel, kind = ?request.kind, id = request.id, "handling IPC message");
        match request.kind {
            FrameKind::Notify => {
                if let Err(e) = router
                    .handle(&request.channel, request.kind, request.payload)
                    .await
                {
                    tracing::warn!(channel = %request.channel, error = %e, "notification handler error");
                }
            }
            FrameKind::Blocking => {
                respond(&router, request, &responses, max_frame_len).await;
            }
            FrameKind::Request => {
                let router = Arc::clone(&router);
                let responses = responses.clone();
                executor
                    .spawn(async move {
                        respond(&router, request, &responses, max_frame_len).await
                    })
                    .detach();
            }
        }
    }
}

async fn respond(
    router: &HostRouter,
    request: IpcRequest,
    responses: &Sender<Vec<u8>>,
    max_frame_len: usize,
) {
    let response = match router
        .handle(&request.channel, request.kind, request.payload)
        .await
    {
        Ok(payload) => IpcResponse::success(request.id, payload),
        Err(e) => {
            tracing::warn!(channel = %request.channel, error = %e, "IPC handler error");
            IpcResponse::error(request.id, &e.to_string()).unwrap_or_else(|_| IpcResponse {
                id: request.id,
                success: false,
                payload: vec![],
            })
        }
    };

    // an oversize reply would cost the front-end its connection
    let frame = response.to_frame(max_frame_len).or_else(|e| {
        tracing::warn!(channel = %request.channel, error = %e, "reply too large");
        IpcResponse::error(request.id, &e.to_string())?.to_frame(max_frame_len)
    });

    match frame {
        Ok(frame) => {
            if responses.try_send(frame).is_err() {
                tracing::debug!(id = request.id, "connection closed before reply");
            }
        }
        Err(e) => tracing::warn!(id = request.id, error = %e, "failed to frame response"),
    }
}
