//! In-memory transport double shared by unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::Serialize;

use crate::ipc::Transport;
use crate::ipc::protocol::{IpcError, encode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Notify,
    Request,
    Blocking,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub kind: CallKind,
    pub channel: String,
    pub payload: Vec<u8>,
}

/// Records every call; requests are answered from queued replies per channel
#[derive(Default)]
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<HashMap<String, VecDeque<Result<Vec<u8>, String>>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_with<T: Serialize + ?Sized>(&self, channel: &str, value: &T) {
        let payload = encode(value).unwrap();
        self.queue(channel, Ok(payload));
    }

    pub fn reject(&self, channel: &str, message: &str) {
        self.queue(channel, Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn queue(&self, channel: &str, reply: Result<Vec<u8>, String>) {
        self.replies
            .lock()
            .unwrap()
            .entry(channel.to_string())
            .or_default()
            .push_back(reply);
    }

    fn record(&self, kind: CallKind, channel: &str, payload: Vec<u8>) {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            channel: channel.to_string(),
            payload,
        });
    }

    fn take_reply(&self, channel: &str) -> Option<Result<Vec<u8>, IpcError>> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(channel)
            .and_then(VecDeque::pop_front)?;
        Some(reply.map_err(IpcError::Remote))
    }
}

impl Transport for RecordingTransport {
    fn notify(&self, channel: &str, payload: Vec<u8>) {
        self.record(CallKind::Notify, channel, payload);
    }

    async fn request(&self, channel: &str, payload: Vec<u8>) -> Result<Vec<u8>, IpcError> {
        self.record(CallKind::Request, channel, payload);
        self.take_reply(channel).unwrap_or(Err(IpcError::Disconnected))
    }

    /// Acknowledged with unit unless a reply was queued
    fn blocking_call(&self, channel: &str) -> Result<Vec<u8>, IpcError> {
        self.record(CallKind::Blocking, channel, encode(&())?);
        self.take_reply(channel).unwrap_or_else(|| encode(&()))
    }
}
