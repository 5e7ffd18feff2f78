//! Mock agent runtime for integration tests
//!
//! Serves `POST /query` and `POST /query/stream` with scripted output and
//! records what it was sent.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use relay_openai::types::{AgentEvent, QueryRequest, QueryResponse};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// What the mock answers with
#[derive(Clone)]
pub enum Script {
    /// Return this response from `/query` and these frames from
    /// `/query/stream`
    Reply {
        response: QueryResponse,
        frames: Vec<Value>,
    },
    /// Fail every request with this status and native error body
    Fail { status: StatusCode, body: Value },
}

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub query: QueryRequest,
    pub authorization: Option<String>,
    pub owner: Option<String>,
}

struct MockState {
    script: Script,
    seen: Mutex<Vec<Recorded>>,
}

/// Running mock runtime
pub struct MockAgent {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockAgent {
    /// Start a mock that replies with the given text, streaming it as one
    /// partial event per word
    pub async fn start_with_text(text: &str) -> anyhow::Result<Self> {
        let response: QueryResponse = serde_json::from_value(serde_json::json!({
            "session_id": "sess-1",
            "content": [{"type": "text", "text": text}],
            "stop_reason": "completed",
            "usage": {"input_tokens": 12, "output_tokens": 7}
        }))?;

        let mut frames: Vec<Value> = vec![serde_json::json!({"type": "init", "session_id": "sess-1"})];
        let words: Vec<&str> = text.split_inclusive(' ').collect();
        frames.extend(words.iter().map(|word| {
            serde_json::to_value(AgentEvent::partial_text(*word)).unwrap_or(Value::Null)
        }));
        frames.push(serde_json::json!({"type": "result", "is_error": false, "stop_reason": "completed"}));
        frames.push(serde_json::json!({"type": "done"}));

        Self::start(Script::Reply { response, frames }).await
    }

    /// Start a mock with an arbitrary script
    pub async fn start(script: Script) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            script,
            seen: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/query", routing::post(handle_query))
            .route("/query/stream", routing::post(handle_query_stream))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to put in `[agent] base_url`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn seen(&self) -> Vec<Recorded> {
        self.state.seen.lock().expect("mock state poisoned").clone()
    }
}

impl Drop for MockAgent {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn record(state: &MockState, headers: &HeaderMap, query: QueryRequest) {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);

    state.seen.lock().expect("mock state poisoned").push(Recorded {
        query,
        authorization: header("authorization"),
        owner: header("x-relay-owner"),
    });
}

async fn handle_query(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(query): Json<QueryRequest>,
) -> Response {
    record(&state, &headers, query);

    match &state.script {
        Script::Reply { response, .. } => Json(response.clone()).into_response(),
        Script::Fail { status, body } => (*status, Json(body.clone())).into_response(),
    }
}

async fn handle_query_stream(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(query): Json<QueryRequest>,
) -> Response {
    record(&state, &headers, query);

    match &state.script {
        Script::Reply { frames, .. } => {
            let events = frames
                .iter()
                .map(|frame| Ok::<_, Infallible>(Event::default().data(frame.to_string())))
                .collect::<Vec<_>>();
            Sse::new(futures_util::stream::iter(events)).into_response()
        }
        Script::Fail { status, body } => (*status, Json(body.clone())).into_response(),
    }
}
