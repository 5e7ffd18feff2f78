use std::collections::HashMap;
use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server_config()?;
        self.validate_model_mapping()?;
        self.validate_auth_config()?;
        Ok(())
    }

    fn validate_server_config(&self) -> anyhow::Result<()> {
        if self.server.drain_timeout_seconds == 0 {
            anyhow::bail!("server.drain_timeout_seconds must be greater than 0");
        }

        if self.agent.request_timeout_seconds == 0 {
            anyhow::bail!("agent.request_timeout_seconds must be greater than 0");
        }

        Ok(())
    }

    /// The mapping must be usable in both directions
    fn validate_model_mapping(&self) -> anyhow::Result<()> {
        if self.openai.models.is_empty() {
            anyhow::bail!("openai.models must map at least one model");
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (external, internal) in &self.openai.models {
            if let Some(previous) = seen.insert(internal.as_str(), external.as_str()) {
                anyhow::bail!(
                    "openai.models maps both '{previous}' and '{external}' to internal model '{internal}'"
                );
            }
        }

        Ok(())
    }

    fn validate_auth_config(&self) -> anyhow::Result<()> {
        let Some(ref auth) = self.auth else {
            return Ok(());
        };

        if !auth.enabled {
            return Ok(());
        }

        if auth.keys.is_empty() {
            anyhow::bail!("auth.keys must contain at least one key when auth is enabled");
        }

        for key in &auth.keys {
            if key.digest().is_none() {
                anyhow::bail!(
                    "auth key '{}' must be a lowercase hex SHA-256 digest (use `relay hash-key`)",
                    key.name
                );
            }
        }

        Ok(())
    }
}
