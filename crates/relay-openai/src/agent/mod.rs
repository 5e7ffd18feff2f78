//! Client for the agent runtime
//!
//! The runtime is an opaque event producer. [`HttpAgentClient`] talks to it
//! over HTTP; tests substitute their own [`AgentClient`].

mod http;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use relay_core::{ApiError, RequestContext};

pub use self::http::HttpAgentClient;
use crate::types::{AgentEvent, QueryRequest, QueryResponse};

/// Header carrying the caller's key hash to the runtime
pub const OWNER_HEADER: &str = "x-relay-owner";

/// Events from one streamed query
///
/// An `Err` item means the runtime failed mid-stream; nothing follows it.
pub type AgentEventStream = Pin<Box<dyn Stream<Item = Result<AgentEvent, ApiError>> + Send>>;

/// Trait implemented by agent runtime backends
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Run a query to completion
    async fn query(&self, request: &QueryRequest, context: &RequestContext) -> Result<QueryResponse, ApiError>;

    /// Run a query and stream its events
    async fn query_stream(&self, request: &QueryRequest, context: &RequestContext)
    -> Result<AgentEventStream, ApiError>;
}
