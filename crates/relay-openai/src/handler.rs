//! Axum route handlers for the OpenAI-compatible endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router, routing};
use futures_util::{Stream, StreamExt};
use relay_core::{ApiError, HttpError, RequestContext, SessionGuard};

use crate::protocol::openai::{ChatRequest, ModelList, ModelObject};
use crate::state::OpenAiState;
use crate::translate::{self, StreamItem, StreamingAdapter, translate_error, translate_response_with_id};

/// Request header overriding the configured permission mode
pub const PERMISSION_MODE_HEADER: &str = "x-permission-mode";

/// Build the `/v1/*` router
///
/// Handlers expect a [`RequestContext`] extension, inserted by the server's
/// request context middleware.
pub fn openai_router(state: OpenAiState) -> Router {
    Router::new()
        .route("/v1/chat/completions", routing::post(chat_completions))
        .route("/v1/models", routing::get(list_models))
        .route("/v1/models/{id}", routing::get(get_model))
        .with_state(state)
}

/// Render any domain error as an `OpenAI` error envelope
pub fn error_response<E: HttpError + ?Sized>(error: &E) -> Response {
    (error.status_code(), Json(translate_error(error))).into_response()
}

/// Handler error rendered as an `OpenAI` envelope
struct OpenAiError(ApiError);

impl From<ApiError> for OpenAiError {
    fn from(error: ApiError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for OpenAiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ApiError::validation(rejection.body_text()).with_code("INVALID_REQUEST_BODY"))
    }
}

impl IntoResponse for OpenAiError {
    fn into_response(self) -> Response {
        error_response(&self.0)
    }
}

/// Handle `POST /v1/chat/completions`
async fn chat_completions(
    State(state): State<OpenAiState>,
    Extension(context): Extension<RequestContext>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, OpenAiError> {
    let Json(request) = payload?;

    let completion_id = translate::new_completion_id();
    let session = state.shutdown().track(completion_id.clone()).ok_or_else(|| {
        ApiError::service_unavailable("server is shutting down").with_code("SERVICE_SHUTTING_DOWN")
    })?;

    let permission_override = headers
        .get(PERMISSION_MODE_HEADER)
        .and_then(|value| value.to_str().ok());
    let query = state.translator().translate(&request, permission_override)?;

    tracing::debug!(
        completion_id = %completion_id,
        model = %request.model,
        internal_model = %query.model,
        stream = request.is_stream(),
        "chat completion request"
    );

    if request.is_stream() {
        let events = state.agent().query_stream(&query, &context).await?;
        let adapter = StreamingAdapter::with_id(request.model, completion_id);
        Ok(sse_response(adapter.adapt_stream(events), session).into_response())
    } else {
        let response = state.agent().query(&query, &context).await?;
        let completion = translate_response_with_id(&response, &request.model, completion_id);
        drop(session);
        Ok(Json(completion).into_response())
    }
}

/// Render adapted items as SSE
///
/// The session stays registered until the body finishes or the client
/// goes away. An error becomes one error event and ends the stream
/// without `[DONE]`.
fn sse_response<S>(items: S, session: SessionGuard) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    S: Stream<Item = Result<StreamItem, ApiError>> + Send + 'static,
{
    let events = items.map(move |item| {
        let _session = &session;
        match item {
            Ok(StreamItem::Chunk(chunk)) => Event::default().json_data(chunk),
            Ok(StreamItem::Done) => Ok(Event::default().data("[DONE]")),
            Err(error) => {
                tracing::warn!(code = error.code(), status = %error.status_code(), "stream ended with error");
                Event::default().json_data(translate_error(&error))
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle `GET /v1/models`
async fn list_models(State(state): State<OpenAiState>) -> Json<ModelList> {
    Json(ModelList {
        object: "list".to_owned(),
        data: state.models().list_models(),
    })
}

/// Handle `GET /v1/models/{id}`
async fn get_model(State(state): State<OpenAiState>, Path(id): Path<String>) -> Result<Json<ModelObject>, OpenAiError> {
    state
        .models()
        .model(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("model '{id}' not found")).with_code("MODEL_NOT_FOUND").into())
}
