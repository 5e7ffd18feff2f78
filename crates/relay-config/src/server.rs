use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::health::HealthConfig;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind, defaults to `0.0.0.0:8000`
    #[serde(default)]
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    /// How long shutdown waits for in-flight sessions
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_seconds: u64,
}

impl ServerConfig {
    pub const fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_seconds)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            health: HealthConfig::default(),
            drain_timeout_seconds: default_drain_timeout(),
        }
    }
}

const fn default_drain_timeout() -> u64 {
    30
}
