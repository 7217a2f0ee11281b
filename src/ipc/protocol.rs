//! Wire protocol types for IPC
//!
//! Wire format:
//! ```text
//! Request:
//!   [4 bytes: body length (u32 BE)]
//!   [1 byte: kind (0 notify, 1 request, 2 blocking)]
//!   [4 bytes: request id (u32 BE)]
//!   [1 byte: channel name length (u8)]
//!   [channel name bytes (UTF-8)]
//!   [payload bytes (MessagePack argument tuple)]
//!
//! Response (requests and blocking calls only):
//!   [4 bytes: body length (u32 BE)]
//!   [4 bytes: request id (u32 BE)]
//!   [1 byte: success flag (0 or 1)]
//!   [payload bytes (MessagePack result or error string)]
//! ```

use std::io::{self, Read};

use futures_lite::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use serde::{Serialize, de::DeserializeOwned};
use smol::channel::Receiver;
use thiserror::Error;

/// Default upper bound for a frame body
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

const REQUEST_HEADER_LEN: usize = 1 + 4 + 1;
const RESPONSE_HEADER_LEN: usize = 4 + 1;

/// Errors that can occur during IPC operations
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("not connected to host")]
    Disconnected,

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid protocol: {0}")]
    InvalidProtocol(String),

    #[error("frame of {0} bytes exceeds limit")]
    FrameTooLarge(usize),

    #[error("channel {channel} does not accept {frame:?} frames")]
    WrongFrameKind { channel: String, frame: FrameKind },

    #[error("handler error: {0}")]
    Handler(String),

    #[error("host rejected call: {0}")]
    Remote(String),
}

/// Encode a value as MessagePack with named struct fields
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, IpcError> {
    rmp_serde::to_vec_named(value).map_err(IpcError::from)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, IpcError> {
    rmp_serde::from_slice(bytes).map_err(IpcError::from)
}

/// How the sender expects a message to be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    /// Fire-and-forget, no response
    Notify = 0,
    /// Correlated response, sender keeps running meanwhile
    Request = 1,
    /// Sender is blocked until the response arrives
    Blocking = 2,
}

impl TryFrom<u8> for FrameKind {
    type Error = IpcError;

    fn try_from(value: u8) -> Result<Self, IpcError> {
        match value {
            0 => Ok(FrameKind::Notify),
            1 => Ok(FrameKind::Request),
            2 => Ok(FrameKind::Blocking),
            other => Err(IpcError::InvalidProtocol(format!("unknown frame kind {other}"))),
        }
    }
}

/// Request parsed from wire format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcRequest {
    pub kind: FrameKind,
    /// Correlation id, zero for notifications
    pub id: u32,
    pub channel: String,
    /// Raw MessagePack arguments (not yet deserialized)
    pub payload: Vec<u8>,
}

impl IpcRequest {
    pub fn new(kind: FrameKind, id: u32, channel: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            kind,
            id,
            channel: channel.into(),
            payload,
        }
    }

    /// Parse a request from a frame body (after the length prefix)
    pub fn from_bytes(data: &[u8]) -> Result<Self, IpcError> {
        if data.len() < REQUEST_HEADER_LEN {
            return Err(IpcError::InvalidProtocol("truncated request header".to_string()));
        }

        let kind = FrameKind::try_from(data[0])?;
        let id = u32::from_be_bytes([data[1], data[2], data[3], data[4]]);
        let name_len = data[5] as usize;
        let rest = &data[REQUEST_HEADER_LEN..];
        if rest.len() < name_len {
            return Err(IpcError::InvalidProtocol("truncated channel name".to_string()));
        }

        let (name, payload) = rest.split_at(name_len);
        let channel = String::from_utf8(name.to_vec())
            .map_err(|e| IpcError::InvalidProtocol(format!("invalid channel UTF-8: {e}")))?;

        Ok(Self {
            kind,
            id,
            channel,
            payload: payload.to_vec(),
        })
    }

    /// Serialize to wire format, length prefix included
    pub fn to_bytes(&self) -> Result<Vec<u8>, IpcError> {
        let name = self.channel.as_bytes();
        if name.len() > u8::MAX as usize {
            return Err(IpcError::InvalidProtocol("channel name too long".to_string()));
        }

        let body_len = REQUEST_HEADER_LEN + name.len() + self.payload.len();
        let mut buf = Vec::with_capacity(4 + body_len);
        buf.extend_from_slice(&frame_len(body_len)?.to_be_bytes());
        buf.push(self.kind as u8);
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.push(name.len() as u8);
        buf.extend_from_slice(name);
        buf.extend_from_slice(&self.payload);

        Ok(buf)
    }

    /// Serialize, refusing bodies longer than the peer accepts
    pub fn to_frame(&self, max_len: usize) -> Result<Vec<u8>, IpcError> {
        bounded(self.to_bytes()?, max_len)
    }
}

/// Response to be sent over wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcResponse {
    pub id: u32,
    /// Whether the request succeeded
    pub success: bool,
    /// Raw MessagePack payload (result or error message)
    pub payload: Vec<u8>,
}

impl IpcResponse {
    /// Create a success response from an already encoded result
    pub fn success(id: u32, payload: Vec<u8>) -> Self {
        Self {
            id,
            success: true,
            payload,
        }
    }

    /// Create an error response
    pub fn error(id: u32, message: &str) -> Result<Self, IpcError> {
        Ok(Self {
            id,
            success: false,
            payload: encode(message)?,
        })
    }

    /// Serialize to wire format, length prefix included
    pub fn to_bytes(&self) -> Result<Vec<u8>, IpcError> {
        let body_len = RESPONSE_HEADER_LEN + self.payload.len();
        let mut buf = Vec::with_capacity(4 + body_len);
        buf.extend_from_slice(&frame_len(body_len)?.to_be_bytes());
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.push(u8::from(self.success));
        buf.extend_from_slice(&self.payload);

        Ok(buf)
    }

    /// Serialize, refusing bodies longer than the peer accepts
    pub fn to_frame(&self, max_len: usize) -> Result<Vec<u8>, IpcError> {
        bounded(self.to_bytes()?, max_len)
    }

    /// Parse a response from a frame body (after the length prefix)
    pub fn from_bytes(data: &[u8]) -> Result<Self, IpcError> {
        if data.len() < RESPONSE_HEADER_LEN {
            return Err(IpcError::InvalidProtocol("truncated response header".to_string()));
        }

        Ok(Self {
            id: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            success: data[4] == 1,
            payload: data[RESPONSE_HEADER_LEN..].to_vec(),
        })
    }

    /// The encoded result, or the host's error message as [`IpcError::Remote`]
    pub fn into_result(self) -> Result<Vec<u8>, IpcError> {
        if self.success {
            Ok(self.payload)
        } else {
            let message: String = decode(&self.payload)
                .unwrap_or_else(|_| String::from_utf8_lossy(&self.payload).to_string());
            Err(IpcError::Remote(message))
        }
    }
}

fn frame_len(body_len: usize) -> Result<u32, IpcError> {
    u32::try_from(body_len).map_err(|_| IpcError::FrameTooLarge(body_len))
}

fn bounded(frame: Vec<u8>, max_len: usize) -> Result<Vec<u8>, IpcError> {
    let body_len = frame.len().saturating_sub(4);
    if body_len > max_len {
        Err(IpcError::FrameTooLarge(body_len))
    } else {
        Ok(frame)
    }
}

fn check_frame_len(len: usize, max_len: usize) -> Result<usize, IpcError> {
    if len == 0 {
        Err(IpcError::InvalidProtocol("empty frame".to_string()))
    } else if len > max_len {
        Err(IpcError::FrameTooLarge(len))
    } else {
        Ok(len)
    }
}

/// Read one frame body; `None` on a clean end of stream
pub(crate) async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<Vec<u8>>, IpcError> {
    let mut len_buf = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut len_buf).await {
        return match e.kind() {
            io::ErrorKind::UnexpectedEof => Ok(None),
            _ => Err(e.into()),
        };
    }

    let len = check_frame_len(u32::from_be_bytes(len_buf) as usize, max_len)?;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Blocking counterpart of [`read_frame`]
pub(crate) fn read_frame_blocking<R: Read>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<Vec<u8>>, IpcError> {
    let mut len_buf = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut len_buf) {
        return match e.kind() {
            io::ErrorKind::UnexpectedEof => Ok(None),
            _ => Err(e.into()),
        };
    }

    let len = check_frame_len(u32::from_be_bytes(len_buf) as usize, max_len)?;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Drain encoded frames onto a stream until the queue closes, then close
/// the write side so the peer sees the end of stream
pub(crate) async fn write_frames<W: AsyncWrite + Unpin>(mut writer: W, frames: Receiver<Vec<u8>>) {
    while let Ok(frame) = frames.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            tracing::debug!(error = %e, "failed to write frame");
            break;
        }
    }

    if let Err(e) = writer.close().await {
        tracing::debug!(error = %e, "failed to close stream");
    }
}
