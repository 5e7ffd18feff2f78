//! Agent runtime wire format
//!
//! The runtime's native stream carries the event kinds of
//! [`AgentEvent`](crate::types::AgentEvent) plus an `error` kind, which is
//! surfaced as an `Err` item instead of an event.

use http::StatusCode;
use relay_core::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::AgentEvent;

/// Error body returned by the runtime, both as a non-2xx response body
/// and as the payload of an `error` stream event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl NativeError {
    /// Convert to an internal error, falling back to `fallback_status`
    /// when the runtime did not say
    ///
    /// The reported status is served unchanged. Values that are not an
    /// error status become a 500.
    pub fn into_api_error(self, fallback_status: u16) -> ApiError {
        let status = StatusCode::from_u16(self.status_code.unwrap_or(fallback_status))
            .ok()
            .filter(|status| status.is_client_error() || status.is_server_error());

        let mut error = match status {
            Some(status) => ApiError::from_status(status, self.message),
            None => ApiError::internal(self.message),
        };

        if let Some(code) = self.code {
            error = error.with_code(code);
        }
        if let Some(details) = self.details {
            error = error.with_details(details);
        }

        error
    }
}

/// One `data:` payload of the runtime's SSE stream
#[derive(Debug, Clone, PartialEq)]
pub enum NativeFrame {
    Event(AgentEvent),
    Error(NativeError),
}

impl NativeFrame {
    /// Parse one SSE data payload
    pub fn parse(data: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(data)?;

        if value.get("type").and_then(Value::as_str) == Some("error") {
            serde_json::from_value(value).map(Self::Error)
        } else {
            serde_json::from_value(value).map(Self::Event)
        }
    }

    /// Event on success, internal error for `error` frames
    pub fn into_result(self) -> Result<AgentEvent, ApiError> {
        match self {
            Self::Event(event) => Ok(event),
            Self::Error(error) => Err(error.into_api_error(500)),
        }
    }
}
