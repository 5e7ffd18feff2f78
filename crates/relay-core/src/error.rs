use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each crate's error type. The server layer renders these
/// into wire envelopes, keeping domain errors decoupled from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error code (e.g. `VALIDATION_ERROR`)
    fn error_code(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// Category of an internal error
///
/// Each category carries a fixed HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid credentials
    Authentication,
    /// Authenticated but not allowed
    Permission,
    /// Malformed or semantically invalid request
    Validation,
    /// Referenced resource does not exist
    NotFound,
    /// Request conflicts with current state
    Conflict,
    /// Caller exceeded their quota
    RateLimited,
    /// Upstream work did not finish in time
    Timeout,
    /// Dependency unavailable or server draining
    ServiceUnavailable,
    /// Unexpected failure
    Internal,
}

impl ErrorKind {
    /// HTTP status code raised for this kind
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Permission => StatusCode::FORBIDDEN,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Code used when the raiser does not supply one
    pub const fn default_code(self) -> &'static str {
        match self {
            Self::Authentication => "AUTHENTICATION_ERROR",
            Self::Permission => "PERMISSION_DENIED",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::RateLimited => "RATE_LIMIT_EXCEEDED",
            Self::Timeout => "TIMEOUT",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Recover a kind from a status code reported by another service
    ///
    /// Statuses outside the taxonomy collapse to `Internal`.
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 => Self::Authentication,
            403 => Self::Permission,
            404 => Self::NotFound,
            409 => Self::Conflict,
            429 => Self::RateLimited,
            408 | 504 => Self::Timeout,
            502 | 503 => Self::ServiceUnavailable,
            _ => Self::Internal,
        }
    }
}

/// Internal error raised anywhere in Relay
///
/// The message must already be safe for clients; redaction is the
/// raiser's job and nothing downstream rewrites it. The status starts as
/// the kind's default and is served as-is, even when it sits outside the
/// kind table.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    status: StatusCode,
    message: String,
    code: String,
    details: Option<Value>,
}

impl ApiError {
    /// Create an error of the given kind with its default code
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: kind.status_code(),
            message: message.into(),
            code: kind.default_code().to_owned(),
            details: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Error carrying a status reported by another service
    ///
    /// The kind is derived from the status; the status itself is kept.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::from_status(status.as_u16()), message).with_status(status)
    }

    /// Override the HTTP status without changing the kind
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Replace the machine-readable code
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl HttpError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_code(&self) -> &str {
        &self.code
    }

    fn client_message(&self) -> String {
        self.message.clone()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!(error = ?error, "unexpected internal error");
        Self::internal("an internal error occurred")
    }
}
