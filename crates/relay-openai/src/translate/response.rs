use super::{new_completion_id, tools, unix_now};
use crate::protocol::openai::{AssistantMessage, ChatCompletion, Choice, FinishReason, Role, Usage};
use crate::types::{QueryResponse, StopReason, TokenUsage};

/// Translate a non-streaming agent response under a fresh completion id
pub fn translate_response(response: &QueryResponse, requested_model: &str) -> ChatCompletion {
    translate_response_with_id(response, requested_model, new_completion_id())
}

/// Translate a non-streaming agent response under a caller-chosen id
///
/// The reported model is the one the runtime says served the query,
/// falling back to the name the client asked for.
pub fn translate_response_with_id(response: &QueryResponse, requested_model: &str, id: String) -> ChatCompletion {
    let has_tool_calls = tools::has_tool_calls(&response.content);

    let tool_calls = has_tool_calls.then(|| tools::translate_tool_use_to_external(&response.content));

    let text = response
        .content
        .iter()
        .any(|block| block.as_text().is_some())
        .then(|| tools::extract_text_content(&response.content));
    let content = text.or_else(|| response.structured_output.as_ref().map(ToString::to_string));

    // Tool calls win over every stop reason, including errors
    let finish_reason = if has_tool_calls {
        FinishReason::ToolCalls
    } else {
        finish_reason(response.stop_reason.as_ref())
    };

    ChatCompletion {
        id,
        object: "chat.completion".to_owned(),
        created: unix_now(),
        model: response.model.clone().unwrap_or_else(|| requested_model.to_owned()),
        choices: vec![Choice {
            index: 0,
            message: AssistantMessage {
                role: Role::Assistant,
                content,
                tool_calls,
            },
            finish_reason,
        }],
        usage: usage(response.usage.as_ref()),
    }
}

/// Map a runtime stop reason; anything unrecognised is a normal stop
pub fn finish_reason(stop_reason: Option<&StopReason>) -> FinishReason {
    match stop_reason {
        Some(StopReason::MaxTurnsReached) => FinishReason::Length,
        Some(StopReason::Error) => FinishReason::Error,
        Some(StopReason::Completed | StopReason::Interrupted | StopReason::Other(_)) | None => FinishReason::Stop,
    }
}

/// Totals are always recomputed from the parts
pub fn usage(usage: Option<&TokenUsage>) -> Usage {
    let usage = usage.copied().unwrap_or_default();

    Usage {
        prompt_tokens: usage.input_tokens,
        completion_tokens: usage.output_tokens,
        total_tokens: usage.input_tokens.saturating_add(usage.output_tokens),
    }
}
