//! Typed stubs over the untyped transport
//!
//! [`make_notifier`], [`make_requester`] and [`make_blocker`] turn a channel
//! marker into a callable stub. The shape bound on each factory keeps one-way
//! channels from being awaited, two-way channels from being fired and
//! forgotten, and blocking channels off the asynchronous paths. At runtime
//! the stubs only encode, forward and decode.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::channel::{Blocking, Channel, OneWay, Output, Reply};
use crate::ipc::Transport;
use crate::ipc::protocol::{IpcError, decode, encode};

/// Stub for a one-way channel
pub struct Notifier<C, T> {
    transport: Arc<T>,
    _channel: PhantomData<fn() -> C>,
}

/// Build the stub for the one-way channel `C`
pub fn make_notifier<C, T>(transport: Arc<T>) -> Notifier<C, T>
where
    C: Channel<Shape = OneWay>,
    T: Transport,
{
    Notifier {
        transport,
        _channel: PhantomData,
    }
}

impl<C, T> Notifier<C, T>
where
    C: Channel<Shape = OneWay>,
    T: Transport,
{
    /// Forward `args` as exactly one notification. Never suspends, never fails.
    pub fn send(&self, args: C::Args) {
        match encode(&args) {
            Ok(payload) => self.transport.notify(C::NAME, payload),
            Err(e) => tracing::warn!(channel = C::NAME, error = %e, "dropping notification"),
        }
    }
}

/// Stub for a two-way channel
pub struct Requester<C, T> {
    transport: Arc<T>,
    _channel: PhantomData<fn() -> C>,
}

/// Build the stub for the two-way channel `C`
pub fn make_requester<C, T>(transport: Arc<T>) -> Requester<C, T>
where
    C: Channel,
    C::Shape: Reply,
    T: Transport,
{
    Requester {
        transport,
        _channel: PhantomData,
    }
}

impl<C, T> Requester<C, T>
where
    C: Channel,
    C::Shape: Reply,
    T: Transport,
{
    /// Forward `args` as exactly one request and decode the reply
    ///
    /// Transport failures and host rejections are returned unchanged.
    pub async fn call(&self, args: C::Args) -> Result<Output<C>, IpcError> {
        let payload = encode(&args)?;
        let reply = self.transport.request(C::NAME, payload).await?;
        decode(&reply)
    }
}

/// Stub for a blocking channel
pub struct Blocker<C, T> {
    transport: Arc<T>,
    _channel: PhantomData<fn() -> C>,
}

/// Build the stub for the blocking channel `C`
pub fn make_blocker<C, T>(transport: Arc<T>) -> Blocker<C, T>
where
    C: Channel<Shape = Blocking>,
    T: Transport,
{
    Blocker {
        transport,
        _channel: PhantomData,
    }
}

impl<C, T> Blocker<C, T>
where
    C: Channel<Shape = Blocking>,
    T: Transport,
{
    /// Halt the calling thread until the host has handled the message
    pub fn call(&self) -> Result<(), IpcError> {
        let reply = self.transport.blocking_call(C::NAME)?;
        decode(&reply)
    }
}

impl<C, T> Clone for Notifier<C, T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            _channel: PhantomData,
        }
    }
}

impl<C, T> Clone for Requester<C, T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            _channel: PhantomData,
        }
    }
}

impl<C: Channel, T> fmt::Debug for Notifier<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").field("channel", &C::NAME).finish()
    }
}

impl<C: Channel, T> fmt::Debug for Blocker<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blocker").field("channel", &C::NAME).finish()
    }
}

impl<C: Channel, T> fmt::Debug for Requester<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester").field("channel", &C::NAME).finish()
    }
}
