//! OpenAI-compatible surface over the agent runtime
//!
//! Translates chat completion requests into agent queries and agent
//! responses and event streams back into chat completions, then serves
//! the result under `/v1/*`.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod agent;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod state;
pub mod translate;
pub mod types;

pub use agent::{AgentClient, AgentEventStream, HttpAgentClient};
pub use error::ModelMapError;
pub use handler::{error_response, openai_router};
pub use state::OpenAiState;
pub use translate::{ModelMapper, RequestTranslator, StreamItem, StreamingAdapter, translate_error};
