use relay_core::HttpError;

use crate::protocol::openai::{ErrorBody, ErrorEnvelope};

/// `OpenAI` error type for an HTTP status
///
/// Total over every status; anything outside the table is `api_error`.
pub const fn error_type(status: u16) -> &'static str {
    match status {
        400 => "invalid_request_error",
        401 => "authentication_error",
        403 => "permission_error",
        429 => "rate_limit_exceeded",
        _ => "api_error",
    }
}

/// Wrap an internal error in the `OpenAI` error envelope
///
/// Message and code pass through untouched.
pub fn translate_error<E: HttpError + ?Sized>(error: &E) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorBody {
            error_type: error_type(error.status_code().as_u16()).to_owned(),
            message: error.client_message(),
            code: error.error_code().to_owned(),
        },
    }
}
