use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ContentBlock;

/// One event from the agent runtime's stream
///
/// Closed on purpose: adding a kind forces every consumer to decide what
/// to do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Session started
    Init {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    /// Incremental content
    Partial {
        #[serde(default)]
        content: Vec<ContentBlock>,
    },
    /// Terminal outcome of a query
    Result(ResultEvent),
    /// Agent asks the user something
    Question(Map<String, Value>),
    /// Agent task list update
    Todo(Map<String, Value>),
    /// Runtime finished emitting
    Done,
}

impl AgentEvent {
    pub fn partial_text(text: impl Into<String>) -> Self {
        Self::Partial {
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// Payload of a `result` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEvent {
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Why the agent stopped
///
/// Values the runtime adds later decode to `Other` instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StopReason {
    Completed,
    MaxTurnsReached,
    Interrupted,
    Error,
    Other(String),
}

impl StopReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::MaxTurnsReached => "max_turns_reached",
            Self::Interrupted => "interrupted",
            Self::Error => "error",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for StopReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "completed" => Self::Completed,
            "max_turns_reached" => Self::MaxTurnsReached,
            "interrupted" => Self::Interrupted,
            "error" => Self::Error,
            _ => Self::Other(value),
        }
    }
}

impl From<StopReason> for String {
    fn from(value: StopReason) -> Self {
        match value {
            StopReason::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token accounting reported by the runtime
///
/// Any total the runtime sends is ignored; totals are always recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u64>,
}
