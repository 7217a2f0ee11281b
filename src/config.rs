use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ipc::protocol::DEFAULT_MAX_FRAME_LEN;

/// Environment variable holding the host socket path
pub const SOCKET_ENV: &str = "TETHER_IPC_SOCKET";

/// Where the host listens and how large a single frame may be
///
/// Shared by [`SocketTransport`](crate::SocketTransport) on the front-end
/// and [`IpcServer`](crate::IpcServer) on the host.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    socket_path: PathBuf,
    max_frame_len: usize,
}

impl TransportConfig {
    /// Create a config for the given socket with default limits
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self::builder(socket_path).build()
    }

    /// Create a new builder for TransportConfig
    pub fn builder(socket_path: impl AsRef<Path>) -> TransportConfigBuilder {
        TransportConfigBuilder {
            inner: Self {
                socket_path: socket_path.as_ref().to_path_buf(),
                max_frame_len: DEFAULT_MAX_FRAME_LEN,
            },
        }
    }

    /// Read the socket path from `TETHER_IPC_SOCKET`
    ///
    /// The host exports it to the front-end process it launches.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(SOCKET_ENV)
            .ok_or_else(|| Error::Config(format!("{SOCKET_ENV} environment variable not set")))?;
        Ok(Self::new(PathBuf::from(path)))
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }
}

/// Builder for TransportConfig
#[derive(Debug)]
pub struct TransportConfigBuilder {
    inner: TransportConfig,
}

impl TransportConfigBuilder {
    pub fn socket_path(mut self, path: impl AsRef<Path>) -> Self {
        self.inner.socket_path = path.as_ref().to_path_buf();
        self
    }

    /// Upper bound for a single frame body, in bytes
    pub fn max_frame_len(mut self, bytes: usize) -> Self {
        self.inner.max_frame_len = bytes;
        self
    }

    pub fn build(self) -> TransportConfig {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = TransportConfig::new("/tmp/tether.sock");
        assert_eq!(config.socket_path(), Path::new("/tmp/tether.sock"));
        assert_eq!(config.max_frame_len(), DEFAULT_MAX_FRAME_LEN);

        let config = TransportConfig::builder("/tmp/a.sock")
            .socket_path("/tmp/b.sock")
            .max_frame_len(1024)
            .build();
        assert_eq!(config.socket_path(), Path::new("/tmp/b.sock"));
        assert_eq!(config.max_frame_len(), 1024);
    }
}
