//! Translation between the `OpenAI` wire format and the agent runtime
//!
//! Everything here is pure except [`StreamingAdapter`], which holds the
//! per-stream state of a single response.

pub mod error;
pub mod model;
pub mod request;
pub mod response;
pub mod stream;
pub mod tools;

use std::time::{SystemTime, UNIX_EPOCH};

pub use error::translate_error;
pub use model::ModelMapper;
pub use request::RequestTranslator;
pub use response::{translate_response, translate_response_with_id};
pub use stream::{StreamItem, StreamingAdapter};

/// Fresh completion identifier, never reused
pub fn new_completion_id() -> String {
    format!("chatcmpl-{}", uuid::Uuid::new_v4().simple())
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_ids_are_prefixed_and_unique() {
        let first = new_completion_id();
        let second = new_completion_id();

        assert!(first.starts_with("chatcmpl-"));
        assert_eq!(first.len(), "chatcmpl-".len() + 32);
        assert_ne!(first, second);
    }
}
