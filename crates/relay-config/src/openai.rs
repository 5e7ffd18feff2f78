use indexmap::IndexMap;
use relay_core::PermissionMode;
use serde::Deserialize;

/// OpenAI-compatible surface configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// Permission mode used when the request does not override it
    #[serde(default)]
    pub default_permission_mode: PermissionMode,
    /// External model name -> internal model identifier, in listing order
    #[serde(default = "default_models")]
    pub models: IndexMap<String, String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            default_permission_mode: PermissionMode::default(),
            models: default_models(),
        }
    }
}

fn default_models() -> IndexMap<String, String> {
    [("gpt-4", "opus"), ("gpt-4o", "sonnet"), ("gpt-4o-mini", "haiku")]
        .into_iter()
        .map(|(external, internal)| (external.to_owned(), internal.to_owned()))
        .collect()
}
