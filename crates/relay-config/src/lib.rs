#![allow(clippy::must_use_candidate)]

pub mod agent;
pub mod auth;
mod env;
pub mod health;
mod loader;
pub mod openai;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use agent::*;
pub use auth::*;
pub use health::*;
pub use openai::*;
pub use server::*;
pub use telemetry::*;

/// Top-level Relay configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream agent runtime
    #[serde(default)]
    pub agent: AgentConfig,
    /// OpenAI-compatible surface
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// API key authentication
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
