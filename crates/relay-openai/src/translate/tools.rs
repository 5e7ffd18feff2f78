//! Tool definitions, invocations and results across the two formats
//!
//! Malformed entries are skipped with a warning. One bad tool should not
//! sink an otherwise valid request.

use serde_json::{Map, Value, json};

use crate::protocol::openai::{ChatMessage, FunctionCall, Role, ToolCall, ToolSpec};
use crate::types::{ContentBlock, ToolDefinition};

/// External tool definitions to internal ones
///
/// Only `function` tools are translated.
pub fn translate_tool_definitions(tools: &[ToolSpec]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .filter_map(|tool| {
            let function = match (tool.tool_type.as_str(), &tool.function) {
                ("function", Some(function)) => function,
                (kind, _) => {
                    tracing::warn!(tool_type = %kind, "skipping unsupported tool definition");
                    return None;
                }
            };

            Some(ToolDefinition {
                name: function.name.clone(),
                description: function.description.clone(),
                input_schema: input_schema(function.parameters.as_ref()),
            })
        })
        .collect()
}

/// Build an input schema from a function's JSON Schema parameters
fn input_schema(parameters: Option<&Value>) -> Value {
    let Some(parameters) = parameters.and_then(Value::as_object) else {
        return json!({"type": "object", "properties": {}});
    };

    let mut schema = Map::new();
    schema.insert(
        "type".to_owned(),
        parameters.get("type").cloned().unwrap_or_else(|| json!("object")),
    );
    schema.insert(
        "properties".to_owned(),
        parameters.get("properties").cloned().unwrap_or_else(|| json!({})),
    );

    if let Some(required) = parameters.get("required").and_then(Value::as_array)
        && !required.is_empty()
    {
        schema.insert("required".to_owned(), Value::Array(required.clone()));
    }

    let additional = match parameters.get("additionalProperties") {
        None | Some(Value::Bool(false)) => Value::Bool(false),
        Some(allowed) => allowed.clone(),
    };
    schema.insert("additionalProperties".to_owned(), additional);

    Value::Object(schema)
}

/// Internal `tool_use` blocks to external tool calls
///
/// Arguments are serialized exactly once. String inputs are passed as-is.
pub fn translate_tool_use_to_external(blocks: &[ContentBlock]) -> Vec<ToolCall> {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                id: id.clone(),
                tool_type: "function".to_owned(),
                function: FunctionCall {
                    name: name.clone(),
                    arguments: encode_arguments(input),
                },
            }),
            _ => None,
        })
        .collect()
}

fn encode_arguments(input: &Value) -> String {
    match input {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// External `tool` messages to internal `tool_result` blocks
///
/// Messages without a `tool_call_id` cannot be correlated and are skipped.
pub fn translate_tool_results(messages: &[ChatMessage]) -> Vec<ContentBlock> {
    messages.iter().filter_map(translate_tool_result).collect()
}

/// One external `tool` message as an internal `tool_result` block
///
/// `None` for other roles, and for tool messages without a `tool_call_id`
/// (logged).
pub fn translate_tool_result(message: &ChatMessage) -> Option<ContentBlock> {
    if message.role != Role::Tool {
        return None;
    }

    let Some(tool_use_id) = &message.tool_call_id else {
        tracing::warn!(name = ?message.name, "skipping tool message without tool_call_id");
        return None;
    };

    Some(ContentBlock::ToolResult {
        tool_use_id: tool_use_id.clone(),
        content: Value::String(message.text_content()),
        is_error: None,
    })
}

/// Whether any block is a tool invocation
pub fn has_tool_calls(blocks: &[ContentBlock]) -> bool {
    blocks.iter().any(ContentBlock::is_tool_use)
}

/// Text of every `text` block, space-joined; empty when there are none
pub fn extract_text_content(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(ContentBlock::as_text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::protocol::openai::FunctionSpec;

    fn function_tool(name: &str, parameters: Option<Value>) -> ToolSpec {
        ToolSpec {
            tool_type: "function".to_owned(),
            function: Some(FunctionSpec {
                name: name.to_owned(),
                description: Some(format!("{name} tool")),
                parameters,
            }),
        }
    }

    #[test]
    fn definition_schema_is_synthesized() {
        let tools = [function_tool(
            "get_weather",
            Some(json!({
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"],
                "description": "ignored"
            })),
        )];

        let translated = translate_tool_definitions(&tools);

        assert_eq!(translated.len(), 1);
        assert_eq!(translated[0].name, "get_weather");
        assert_eq!(translated[0].description.as_deref(), Some("get_weather tool"));
        assert_eq!(
            translated[0].input_schema,
            json!({
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn empty_required_is_omitted_and_explicit_additional_kept() {
        let tools = [function_tool(
            "search",
            Some(json!({"type": "object", "properties": {}, "required": [], "additionalProperties": true})),
        )];

        let schema = &translate_tool_definitions(&tools)[0].input_schema;
        assert!(schema.get("required").is_none());
        assert_eq!(schema["additionalProperties"], json!(true));
    }

    #[test]
    fn missing_parameters_default_to_empty_object() {
        let schema = &translate_tool_definitions(&[function_tool("noop", None)])[0].input_schema;
        assert_eq!(*schema, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn non_function_tools_are_skipped() {
        let tools = [
            ToolSpec {
                tool_type: "code_interpreter".to_owned(),
                function: None,
            },
            function_tool("kept", None),
        ];

        let translated = translate_tool_definitions(&tools);
        assert_eq!(translated.len(), 1);
        assert_eq!(translated[0].name, "kept");
    }

    #[test]
    fn tool_use_arguments_round_trip() {
        let inputs = [
            json!({}),
            json!({"city": "Paris", "days": 3}),
            json!({"nested": {"list": [1, 2, {"deep": null}], "flag": true}, "unicode": "héllo \"quoted\""}),
        ];

        for input in inputs {
            let blocks = [ContentBlock::ToolUse {
                id: "toolu_1".to_owned(),
                name: "f".to_owned(),
                input: input.clone(),
            }];

            let calls = translate_tool_use_to_external(&blocks);
            let decoded: Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
            assert_eq!(decoded, input);
        }
    }

    #[test]
    fn string_input_is_not_double_encoded() {
        let blocks = [ContentBlock::ToolUse {
            id: "toolu_1".to_owned(),
            name: "f".to_owned(),
            input: json!(r#"{"already":"encoded"}"#),
        }];

        let calls = translate_tool_use_to_external(&blocks);
        assert_eq!(calls[0].function.arguments, r#"{"already":"encoded"}"#);
        assert_eq!(calls[0].tool_type, "function");
    }

    #[test]
    fn only_tool_use_blocks_become_calls() {
        let blocks = [
            ContentBlock::text("thinking out loud"),
            ContentBlock::ToolUse {
                id: "a".to_owned(),
                name: "first".to_owned(),
                input: json!({}),
            },
            ContentBlock::ToolUse {
                id: "b".to_owned(),
                name: "second".to_owned(),
                input: json!({"x": 1}),
            },
        ];

        let ids: Vec<_> = translate_tool_use_to_external(&blocks).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn tool_results_require_call_id() {
        let mut orphan = ChatMessage::text(Role::Tool, "lost");
        orphan.name = Some("get_weather".to_owned());
        let mut answered = ChatMessage::text(Role::Tool, "22C");
        answered.tool_call_id = Some("call_1".to_owned());

        let messages = [ChatMessage::text(Role::User, "hi"), orphan, answered];
        let results = translate_tool_results(&messages);

        assert_eq!(
            results,
            [ContentBlock::ToolResult {
                tool_use_id: "call_1".to_owned(),
                content: json!("22C"),
                is_error: None,
            }]
        );
    }

    #[test]
    fn single_tool_result_ignores_other_roles() {
        let mut assistant = ChatMessage::text(Role::Assistant, "done");
        assistant.tool_call_id = Some("call_9".to_owned());
        assert_eq!(translate_tool_result(&assistant), None);

        let mut tool = ChatMessage::text(Role::Tool, "ok");
        tool.tool_call_id = Some("call_9".to_owned());
        assert_eq!(
            translate_tool_result(&tool),
            Some(ContentBlock::ToolResult {
                tool_use_id: "call_9".to_owned(),
                content: json!("ok"),
                is_error: None,
            })
        );
    }

    #[test]
    fn block_queries() {
        let blocks = [
            ContentBlock::text("Hello"),
            ContentBlock::Thinking {
                thinking: "hidden".to_owned(),
                signature: None,
            },
            ContentBlock::text("World"),
        ];

        assert!(!has_tool_calls(&blocks));
        assert_eq!(extract_text_content(&blocks), "Hello World");
        assert_eq!(extract_text_content(&[]), "");
    }
}
