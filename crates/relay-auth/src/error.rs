use http::StatusCode;
use relay_core::{ApiError, HttpError};

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No key was presented on a protected path
    #[error("missing API key")]
    MissingKey,

    /// Presented key does not match any configured key
    #[error("invalid API key")]
    InvalidKey,
}

impl HttpError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_code(&self) -> &str {
        match self {
            Self::MissingKey => "MISSING_API_KEY",
            Self::InvalidKey => "INVALID_API_KEY",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        Self::authentication(error.client_message()).with_code(error.error_code())
    }
}
