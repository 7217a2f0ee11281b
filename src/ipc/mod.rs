//! Inter-Process Communication (IPC) between the front-end and the host
//!
//! Messages travel over a Unix domain socket as length-prefixed frames with
//! MessagePack payloads. The front-end side is a [`Transport`], normally a
//! [`SocketTransport`]; the host side is an [`IpcServer`] dispatching to a
//! [`HostRouter`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tether::channel::{IsWindowFocused, RendererReady};
//! use tether::{HostRouter, IpcServer, TransportConfig};
//!
//! let router = HostRouter::new()
//!     .on_notify::<RendererReady, _, _>(|()| async { tracing::info!("front-end ready") })
//!     .on_request::<IsWindowFocused, _, _>(|()| async { Ok(true) });
//!
//! let config = TransportConfig::new("/tmp/tether.sock");
//! let server = IpcServer::new(router, &config, executor).await?;
//! ```

pub mod protocol;
mod router;
mod server;
mod transport;

pub use protocol::IpcError;
pub use router::HostRouter;
pub use server::IpcServer;
pub use transport::{SocketTransport, Transport};
