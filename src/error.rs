use std::io;

use thiserror::Error;

use crate::ipc::IpcError;

/// Result type for tether operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or running a bridge endpoint
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
