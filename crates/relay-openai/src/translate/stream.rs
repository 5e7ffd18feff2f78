//! Agent event stream to `OpenAI` delta chunks
//!
//! One [`StreamingAdapter`] serves exactly one response. It emits the role
//! delta before anything else, one content delta per text block, one
//! finish chunk per result event, and a terminal [`StreamItem::Done`] once
//! the upstream sequence is exhausted.
//!
//! An upstream error is passed through as the final item and no `Done`
//! follows it, so callers can tell a finished stream from a broken one.
//! Dropping the stream drops the upstream with it.

use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};
use relay_core::ApiError;

use super::{new_completion_id, unix_now};
use crate::protocol::openai::{ChatCompletionChunk, ChunkChoice, Delta, FinishReason, Role};
use crate::types::AgentEvent;

/// Item produced by [`StreamingAdapter::adapt_stream`]
#[derive(Debug, Clone)]
pub enum StreamItem {
    /// One delta chunk
    Chunk(ChatCompletionChunk),
    /// End of stream, rendered as `[DONE]` on the wire
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    Streaming,
    Done,
}

/// Per-stream translation state
#[derive(Debug)]
pub struct StreamingAdapter {
    id: String,
    model: String,
    created: u64,
    phase: Phase,
}

impl StreamingAdapter {
    /// Adapter reporting `model` under a freshly generated completion id
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_id(model, new_completion_id())
    }

    /// Adapter reporting `model` under a caller-chosen completion id
    pub fn with_id(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            created: unix_now(),
            phase: Phase::NotStarted,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Chunks produced by one upstream event
    pub fn adapt_event(&mut self, event: &AgentEvent) -> Vec<ChatCompletionChunk> {
        let mut chunks = Vec::new();

        if self.phase == Phase::NotStarted {
            self.phase = Phase::Streaming;
            chunks.push(self.chunk(
                Delta {
                    role: Some(Role::Assistant),
                    content: None,
                },
                None,
            ));
        }

        match event {
            AgentEvent::Partial { content } => {
                // Thinking and tool blocks have no delta form here
                for text in content.iter().filter_map(|block| block.as_text()) {
                    chunks.push(self.chunk(
                        Delta {
                            role: None,
                            content: Some(text.to_owned()),
                        },
                        None,
                    ));
                }
            }
            AgentEvent::Result(result) => {
                let finish_reason = if result.is_error {
                    FinishReason::Error
                } else {
                    FinishReason::Stop
                };
                chunks.push(self.chunk(Delta::default(), Some(finish_reason)));
            }
            AgentEvent::Init { .. } | AgentEvent::Question(_) | AgentEvent::Todo(_) | AgentEvent::Done => {}
        }

        chunks
    }

    /// Terminal marker, returned at most once per adapter
    pub fn finish(&mut self) -> Option<StreamItem> {
        if self.phase == Phase::Done {
            return None;
        }
        self.phase = Phase::Done;
        Some(StreamItem::Done)
    }

    /// Adapt a whole upstream sequence
    ///
    /// Chunks keep the relative order of the events that produced them.
    pub fn adapt_stream<S>(self, events: S) -> impl Stream<Item = Result<StreamItem, ApiError>> + Send
    where
        S: Stream<Item = Result<AgentEvent, ApiError>> + Send + 'static,
    {
        let events: Pin<Box<S>> = Box::pin(events);

        stream::unfold(Some((self, events)), |state| async move {
            let (mut adapter, mut events) = state?;

            match events.next().await {
                Some(Ok(event)) => {
                    let items = adapter
                        .adapt_event(&event)
                        .into_iter()
                        .map(|chunk| Ok(StreamItem::Chunk(chunk)))
                        .collect::<Vec<_>>();
                    Some((items, Some((adapter, events))))
                }
                Some(Err(error)) => Some((vec![Err(error)], None)),
                None => Some((adapter.finish().into_iter().map(Ok).collect(), None)),
            }
        })
        .flat_map(stream::iter)
    }

    fn chunk(&self, delta: Delta, finish_reason: Option<FinishReason>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: self.id.clone(),
            object: "chat.completion.chunk".to_owned(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }
}
