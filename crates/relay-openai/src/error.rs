use http::StatusCode;
use relay_core::{ApiError, HttpError};
use thiserror::Error;

/// Model table errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelMapError {
    /// Name absent from the table
    #[error("model '{0}' is not available")]
    UnknownModel(String),

    /// Same external name configured twice
    #[error("external model '{0}' is mapped more than once")]
    DuplicateExternal(String),

    /// Two external names point at one internal name, so the reverse
    /// lookup would be ambiguous
    #[error("external models '{first}' and '{second}' both map to internal model '{internal}'")]
    DuplicateInternal {
        internal: String,
        first: String,
        second: String,
    },
}

impl HttpError for ModelMapError {
    fn status_code(&self) -> StatusCode {
        match self {
            // A client naming an unknown model is a client mistake
            Self::UnknownModel(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateExternal(_) | Self::DuplicateInternal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Self::UnknownModel(_) => "MODEL_NOT_FOUND",
            Self::DuplicateExternal(_) | Self::DuplicateInternal { .. } => "INVALID_MODEL_MAPPING",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl From<ModelMapError> for ApiError {
    fn from(error: ModelMapError) -> Self {
        match error {
            ModelMapError::UnknownModel(_) => Self::validation(error.client_message()).with_code(error.error_code()),
            other => Self::internal(other.client_message()).with_code(other.error_code()),
        }
    }
}
