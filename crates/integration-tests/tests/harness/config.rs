//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use relay_config::{AgentConfig, ApiKeyConfig, AuthConfig, Config, HealthConfig, ServerConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal config talking to the agent runtime at `agent_url`
    pub fn new(agent_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    drain_timeout_seconds: 5,
                },
                agent: AgentConfig {
                    base_url: agent_url.parse().expect("valid URL"),
                    api_key: Some(SecretString::from("runtime-key")),
                    request_timeout_seconds: 10,
                },
                ..Config::default()
            },
        }
    }

    /// Map an external model name to an internal one
    pub fn with_model(mut self, external: &str, internal: &str) -> Self {
        self.config
            .openai
            .models
            .insert(external.to_owned(), internal.to_owned());
        self
    }

    /// Require API keys; each raw key is stored as its digest
    pub fn with_auth_keys(mut self, keys: &[(&str, &str)]) -> Self {
        self.config.auth = Some(AuthConfig {
            enabled: true,
            public_paths: vec!["/health".to_owned()],
            keys: keys
                .iter()
                .map(|(name, raw)| ApiKeyConfig {
                    name: (*name).to_owned(),
                    hash: relay_auth::hash_api_key(raw).to_string(),
                })
                .collect(),
        });
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
