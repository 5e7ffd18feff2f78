use relay_auth::ApiKeyHash;
use serde::Deserialize;

/// API key authentication configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether API key auth is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Paths that skip authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    /// Accepted keys, stored as SHA-256 hex digests
    #[serde(default)]
    pub keys: Vec<ApiKeyConfig>,
}

/// One accepted API key
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiKeyConfig {
    /// Label attached to requests made with this key
    pub name: String,
    /// Lowercase hex SHA-256 of the key (see `relay hash-key`)
    pub hash: String,
}

impl ApiKeyConfig {
    /// The configured digest, or `None` when `hash` is not one
    pub fn digest(&self) -> Option<ApiKeyHash> {
        ApiKeyHash::from_hex(&self.hash)
    }
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_owned()]
}
