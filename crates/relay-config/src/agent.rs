use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Connection to the agent runtime that executes queries
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Base URL of the runtime's HTTP API
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer token presented to the runtime
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Upper bound for a non-streaming query
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl AgentConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

#[allow(clippy::missing_panics_doc)]
fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:9000").expect("valid default URL")
}

const fn default_request_timeout() -> u64 {
    600
}
