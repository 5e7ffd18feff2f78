//! Internal agent-runtime types
//!
//! These mirror the agent runtime's native shapes. Translation to and from
//! the `OpenAI` wire format lives in [`crate::translate`].

mod block;
mod event;
mod query;

pub use block::ContentBlock;
pub use event::{AgentEvent, ResultEvent, StopReason, TokenUsage};
pub use query::{QueryRequest, QueryResponse, ToolDefinition};
