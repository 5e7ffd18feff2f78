use std::sync::Arc;

use relay_core::{ApiError, PermissionMode};
use serde_json::{Value, json};

use super::model::ModelMapper;
use super::tools;
use crate::protocol::openai::{ChatMessage, ChatRequest, ResponseFormat, Role};
use crate::types::{ContentBlock, QueryRequest};

/// Builds agent queries from chat completion requests
#[derive(Debug, Clone)]
pub struct RequestTranslator {
    models: Arc<ModelMapper>,
    default_permission_mode: PermissionMode,
}

impl RequestTranslator {
    pub const fn new(models: Arc<ModelMapper>, default_permission_mode: PermissionMode) -> Self {
        Self {
            models,
            default_permission_mode,
        }
    }

    /// Translate one chat request
    ///
    /// `permission_override` is the raw value the caller asked for; values
    /// outside the permission enum fall back to the configured default.
    ///
    /// # Errors
    ///
    /// Validation error when the model is unknown or no user, assistant or
    /// tool message remains after extracting system messages
    pub fn translate(&self, request: &ChatRequest, permission_override: Option<&str>) -> Result<QueryRequest, ApiError> {
        let model = self.models.to_internal(&request.model)?.to_owned();

        warn_unsupported_parameters(request);

        let (system, conversation): (Vec<&ChatMessage>, Vec<&ChatMessage>) =
            request.messages.iter().partition(|message| message.role == Role::System);

        let system_prompt = (!system.is_empty()).then(|| {
            system
                .iter()
                .map(|message| message.text_content())
                .collect::<Vec<_>>()
                .join("\n\n")
        });

        let prompt = render_prompt(&conversation);
        if prompt.is_empty() {
            return Err(ApiError::validation(
                "at least one user, assistant, or tool message is required",
            ));
        }

        let tools = request
            .tools
            .as_deref()
            .map(tools::translate_tool_definitions)
            .filter(|definitions| !definitions.is_empty());

        Ok(QueryRequest {
            prompt,
            system_prompt,
            model,
            permission_mode: self.resolve_permission_mode(permission_override),
            user: request.user.clone(),
            tools,
            output_format: request.response_format.as_ref().and_then(output_format),
            max_turns: None,
        })
    }

    fn resolve_permission_mode(&self, requested: Option<&str>) -> PermissionMode {
        let Some(requested) = requested else {
            return self.default_permission_mode;
        };

        requested.parse().unwrap_or_else(|_| {
            tracing::warn!(
                requested = %requested,
                fallback = %self.default_permission_mode,
                "unknown permission mode, using default"
            );
            self.default_permission_mode
        })
    }
}

fn warn_unsupported_parameters(request: &ChatRequest) {
    let present = [
        ("temperature", request.temperature.is_some()),
        ("top_p", request.top_p.is_some()),
        ("max_tokens", request.max_tokens.is_some()),
        ("stop", request.stop.is_some()),
    ];

    for (parameter, _) in present.into_iter().filter(|(_, set)| *set) {
        tracing::warn!(parameter, "parameter is not supported and will be ignored");
    }
}

/// Flatten the non-system conversation into one role-tagged prompt
///
/// Tool messages are rendered from their `tool_result` block, so one that
/// cannot be correlated leaves no trace in the prompt.
fn render_prompt(messages: &[&ChatMessage]) -> String {
    let mut prompt = String::new();

    for message in messages {
        match message.role {
            Role::Tool => {
                if let Some(ContentBlock::ToolResult {
                    tool_use_id, content, ..
                }) = tools::translate_tool_result(message)
                {
                    let name = message.name.as_deref().unwrap_or("unknown");
                    let content = content.as_str().map_or_else(|| content.to_string(), str::to_owned);
                    prompt.push_str(&format!("TOOL_RESULT ({name}, id={tool_use_id}): {content}\n\n"));
                }
            }
            Role::Assistant => {
                prompt.push_str(&format!("ASSISTANT: {}\n", message.text_content()));
                match message.tool_calls.as_deref() {
                    Some(calls) if !calls.is_empty() => {
                        prompt.push_str("[Tool Calls]\n");
                        for call in calls {
                            prompt.push_str(&format!(
                                "  - {}(id={}): {}\n",
                                call.function.name, call.id, call.function.arguments
                            ));
                        }
                        prompt.push('\n');
                    }
                    _ => prompt.push('\n'),
                }
            }
            Role::User | Role::System => {
                let role = message.role.as_str().to_uppercase();
                prompt.push_str(&format!("{role}: {}\n\n", message.text_content()));
            }
        }
    }

    prompt
}

fn output_format(format: &ResponseFormat) -> Option<Value> {
    match format {
        ResponseFormat::Text => None,
        ResponseFormat::JsonObject => Some(json!({"type": "json_object"})),
        ResponseFormat::JsonSchema { json_schema } => {
            let mut output = json!({
                "type": "json_schema",
                "name": json_schema.name,
                "schema": json_schema.schema.clone().unwrap_or_else(|| json!({"type": "object"})),
            });
            if let Some(strict) = json_schema.strict {
                output["strict"] = Value::Bool(strict);
            }
            Some(output)
        }
    }
}
