//! Host-side router for dispatching channel messages

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::channel::{Blocking, Channel, ChannelKind, OneWay, Output, Reply, Shape};
use crate::ipc::protocol::{FrameKind, IpcError, decode, encode};

/// Type-erased handler function
type ErasedHandler = Box<
    dyn Fn(Vec<u8>) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, IpcError>> + Send>>
        + Send
        + Sync,
>;

struct Route {
    kind: ChannelKind,
    handler: ErasedHandler,
}

impl Route {
    /// One-way channels also take requests, which are acknowledged with unit
    fn accepts(&self, frame: FrameKind) -> bool {
        matches!(
            (self.kind, frame),
            (ChannelKind::OneWay, FrameKind::Notify | FrameKind::Request)
                | (ChannelKind::TwoWay, FrameKind::Request)
                | (ChannelKind::Blocking, FrameKind::Blocking)
        )
    }
}

/// Router that dispatches incoming channel messages to registered handlers
///
/// Handlers are stored type-erased, but registration is typed by the
/// channel marker, so a handler always receives the channel's argument
/// tuple and must produce the channel's output.
///
/// # Example
///
/// ```rust,ignore
/// let router = HostRouter::new()
///     .on_notify::<RendererReady, _, _>(|()| async { tracing::info!("ready") })
///     .on_request::<IsWindowFocused, _, _>(|()| async { Ok(true) });
/// ```
pub struct HostRouter {
    routes: HashMap<&'static str, Route>,
}

impl HostRouter {
    /// Create a new empty router
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register the handler for a one-way channel
    pub fn on_notify<C, F, Fut>(mut self, handler: F) -> Self
    where
        C: Channel<Shape = OneWay>,
        F: Fn(C::Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.insert::<C>(acknowledging::<C, _, _>(handler));
        self
    }

    /// Register the handler for a blocking channel
    ///
    /// The blocked sender is released once the handler completes.
    pub fn on_blocking<C, F, Fut>(mut self, handler: F) -> Self
    where
        C: Channel<Shape = Blocking>,
        F: Fn(C::Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.insert::<C>(acknowledging::<C, _, _>(handler));
        self
    }

    /// Register the handler for a two-way channel
    ///
    /// An `Err` from the handler is sent back as a rejected reply.
    pub fn on_request<C, F, Fut>(mut self, handler: F) -> Self
    where
        C: Channel,
        C::Shape: Reply,
        F: Fn(C::Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Output<C>, String>> + Send + 'static,
    {
        let handler: ErasedHandler = Box::new(move |payload: Vec<u8>| {
            let args = decode::<C::Args>(&payload);
            let call = args.map(&handler);
            Box::pin(async move {
                let output = call?.await.map_err(IpcError::Handler)?;
                encode(&output)
            })
        });

        self.insert::<C>(handler);
        self
    }

    fn insert<C: Channel>(&mut self, handler: ErasedHandler) {
        let kind = <C::Shape as Shape>::KIND;
        if self
            .routes
            .insert(C::NAME, Route { kind, handler })
            .is_some()
        {
            tracing::warn!(channel = C::NAME, "replaced existing handler");
        }
    }

    /// Handle an incoming message
    ///
    /// This is called internally by the IPC server.
    pub(crate) async fn handle(
        &self,
        channel: &str,
        frame: FrameKind,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, IpcError> {
        let route = self
            .routes
            .get(channel)
            .ok_or_else(|| IpcError::UnknownChannel(channel.to_string()))?;
        if !route.accepts(frame) {
            return Err(IpcError::WrongFrameKind {
                channel: channel.to_string(),
                frame,
            });
        }

        (route.handler)(payload).await
    }

    /// Registered channel names with their shapes
    pub fn channels(&self) -> impl Iterator<Item = (&'static str, ChannelKind)> + '_ {
        self.routes.iter().map(|(name, route)| (*name, route.kind))
    }
}

impl Default for HostRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Erase a unit-returning handler; its completion is the reply
fn acknowledging<C, F, Fut>(handler: F) -> ErasedHandler
where
    C: Channel,
    F: Fn(C::Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move |payload: Vec<u8>| {
        let args = decode::<C::Args>(&payload);
        let call = args.map(&handler);
        Box::pin(async move {
            call?.await;
            encode(&())
        })
    })
}
