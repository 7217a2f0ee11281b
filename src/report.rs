//! Error normalization for reporting to the host
//!
//! Errors raised on the front-end are reduced to a [`NormalizedError`], a
//! plain record that can be serialized and sent exactly once on the
//! `uncaught-exception` or `send-error-report` channel.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::panic::PanicHookInfo;

use serde::{Deserialize, Serialize};

/// Name used when a raised error does not carry one
pub const DEFAULT_ERROR_NAME: &str = "Error";

/// Transport-safe description of an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub message: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// An error as observed at the reporting boundary, before normalization
#[derive(Debug, Clone)]
pub struct RaisedError {
    rendered: String,
    message: Option<String>,
    name: Option<String>,
    stack: Option<String>,
}

impl RaisedError {
    /// Start from the error's full string conversion
    pub fn new(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            message: None,
            name: None,
            stack: None,
        }
    }

    /// Capture a standard error: `Display` is the message, the type is the name
    ///
    /// The string conversion is `"{name}: {message}"`, or just the name when
    /// the error displays as nothing.
    pub fn from_error<E: StdError + 'static>(error: &E) -> Self {
        let name = short_type_name::<E>();
        let message = error.to_string();
        let rendered = if message.is_empty() {
            name.to_string()
        } else {
            format!("{name}: {message}")
        };
        Self::new(rendered).message(message).name(name)
    }

    /// Capture a panic from inside a panic hook
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let raised = Self::new(info.to_string()).name("panic");
        match panic_message(info.payload()) {
            Some(message) => raised.message(message),
            None => raised,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach a backtrace as the stack, if one was actually captured
    pub fn backtrace(self, backtrace: &Backtrace) -> Self {
        match backtrace.status() {
            BacktraceStatus::Captured => self.stack(backtrace.to_string()),
            _ => self,
        }
    }

    /// Reduce to the record sent over the wire
    pub fn normalize(&self) -> NormalizedError {
        normalize_error(self)
    }
}

/// Build the transport record for a raised error
///
/// An empty or missing message falls back to the error's string conversion.
/// A missing name falls back to [`DEFAULT_ERROR_NAME`]. The stack stays
/// absent rather than empty.
pub fn normalize_error(error: &RaisedError) -> NormalizedError {
    let message = error
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(&error.rendered)
        .to_string();
    let name = error
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_ERROR_NAME)
        .to_string();
    let stack = error.stack.clone().filter(|s| !s.is_empty());

    NormalizedError {
        message,
        name,
        stack,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        Some((*message).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

/// `std::io::error::Error` -> `Error`, `foo::Wrapper<bar::Baz>` -> `Wrapper`
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_normalize_keeps_all_fields() {
        let raised = RaisedError::new("TypeError: boom")
            .message("boom")
            .name("TypeError")
            .stack("at main (app.rs:1)");
        let record = normalize_error(&raised);
        assert_eq!(
            record,
            NormalizedError {
                message: "boom".to_string(),
                name: "TypeError".to_string(),
                stack: Some("at main (app.rs:1)".to_string()),
            }
        );
    }

    #[test]
    fn test_empty_message_uses_string_conversion() {
        let raised = RaisedError::new("TypeError").message("").name("TypeError");
        assert_eq!(normalize_error(&raised).message, "TypeError");

        let raised = RaisedError::new("something odd");
        assert_eq!(normalize_error(&raised).message, "something odd");
    }

    #[test]
    fn test_missing_name_and_stack() {
        let record = RaisedError::new("x").message("boom").normalize();
        assert_eq!(record.name, DEFAULT_ERROR_NAME);
        assert_eq!(record.stack, None);

        let record = RaisedError::new("x").name("").stack("").normalize();
        assert_eq!(record.name, DEFAULT_ERROR_NAME);
        assert_eq!(record.stack, None);
    }

    #[test]
    fn test_from_std_error() {
        let err = io::Error::new(io::ErrorKind::NotFound, "config.toml missing");
        let record = RaisedError::from_error(&err).normalize();
        assert_eq!(record.message, "config.toml missing");
        assert_eq!(record.name, "Error");
        assert!(record.stack.is_none());

        // nothing to display: the conversion falls back to the type name
        let err = io::Error::new(io::ErrorKind::NotFound, "");
        assert_eq!(RaisedError::from_error(&err).normalize().message, "Error");
    }

    #[test]
    fn test_from_error_renders_name_and_display() {
        #[derive(Debug, thiserror::Error)]
        #[error("{0} rejected")]
        struct Rejected(&'static str);

        let raised = RaisedError::from_error(&Rejected("push")).message("");
        assert_eq!(raised.normalize().message, "Rejected: push rejected");
        assert_eq!(raised.normalize().name, "Rejected");
    }

    #[test]
    fn test_disabled_backtrace_is_not_a_stack() {
        let record = RaisedError::new("x")
            .backtrace(&Backtrace::disabled())
            .normalize();
        assert!(record.stack.is_none());

        let record = RaisedError::new("x")
            .backtrace(&Backtrace::force_capture())
            .normalize();
        // unsupported platforms report an empty capture
        if let Some(stack) = record.stack {
            assert!(!stack.is_empty());
        }
    }

    #[test]
    fn test_panic_payload_message() {
        let payload: Box<dyn Any + Send> = Box::new("index out of bounds");
        assert_eq!(
            panic_message(payload.as_ref()).as_deref(),
            Some("index out of bounds")
        );

        let payload: Box<dyn Any + Send> = Box::new(String::from("formatted 42"));
        assert_eq!(panic_message(payload.as_ref()).as_deref(), Some("formatted 42"));

        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), None);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<io::Error>(), "Error");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<crate::ipc::IpcError>(), "IpcError");
    }

    #[test]
    fn test_wire_form_omits_absent_stack() {
        let record = RaisedError::new("x").message("boom").normalize();
        let bytes = crate::ipc::protocol::encode(&record).unwrap();
        let value: serde_json::Value = crate::ipc::protocol::decode(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({"message": "boom", "name": "Error"}));
    }
}
