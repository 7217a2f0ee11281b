//! tether - Typed channels between a sandboxed front-end and its host
//!
//! A sandboxed front-end process cannot show native dialogs, touch the file
//! system, render menus or control the process lifecycle. It asks the
//! privileged host to do it over named channels, and this crate makes every
//! one of those channels typed:
//!
//! - [`channel`] declares the catalogue: each channel's wire name, argument
//!   tuple and whether it is one-way, two-way or blocking.
//! - [`proxy`] builds typed stubs over an untyped [`Transport`].
//! - [`HostApi`] bundles one method per channel for the front-end.
//! - [`menu`] sends menu trees without their local actions and routes the
//!   host's selection back to the original tree.
//! - [`report`] turns errors and panics into plain, transportable records.
//! - [`ipc`] carries the frames over a Unix domain socket, with
//!   [`HostRouter`] and [`IpcServer`] on the host side.
//!
//! # Example
//!
//! ```rust,ignore
//! use tether::menu::MenuItem;
//! use tether::{HostApi, SocketTransport, TransportConfig};
//!
//! async fn context_menu() -> tether::Result<()> {
//!     let config = TransportConfig::from_env()?;
//!     let transport = SocketTransport::connect(&config, executor).await?;
//!     let host = HostApi::new(transport);
//!
//!     let items = vec![
//!         MenuItem::builder("copy").label("Copy").action(|| copy_selection()).build(),
//!         MenuItem::separator("sep"),
//!         MenuItem::builder("reveal").label("Show in Folder").action(|| reveal()).build(),
//!     ];
//!     host.show_contextual_menu(&items, false).await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
mod config;
mod error;
mod host;
pub mod ipc;
pub mod menu;
pub mod proxy;
pub mod report;
#[cfg(test)]
mod testing;

// Re-export public types
pub use channel::{Blocking, Channel, ChannelKind, OneWay, TwoWay};
pub use config::{SOCKET_ENV, TransportConfig, TransportConfigBuilder};
pub use error::{Error, Result};
pub use host::HostApi;
pub use ipc::{HostRouter, IpcError, IpcServer, SocketTransport, Transport};
pub use proxy::{Blocker, Notifier, Requester, make_blocker, make_notifier, make_requester};
pub use report::{NormalizedError, RaisedError, normalize_error};
