use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use relay_config::AgentConfig;
use relay_core::{ApiError, RequestContext};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{AgentClient, AgentEventStream, OWNER_HEADER};
use crate::protocol::agent::{NativeError, NativeFrame};
use crate::types::{QueryRequest, QueryResponse};

/// Agent runtime reached over HTTP
pub struct HttpAgentClient {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    request_timeout: Duration,
}

impl HttpAgentClient {
    /// Create from agent configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &AgentConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build agent HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            request_timeout: config.request_timeout(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    fn post(&self, path: &str, request: &QueryRequest, context: &RequestContext) -> RequestBuilder {
        let mut builder = self.client.post(self.endpoint(path)).json(request);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }
        if let Some(owner) = context.owner_hash() {
            builder = builder.header(OWNER_HEADER, owner);
        }

        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, base_url = %self.base_url, "agent runtime request failed");
            if e.is_timeout() {
                ApiError::timeout("agent runtime did not respond in time").with_code("AGENT_TIMEOUT")
            } else {
                ApiError::service_unavailable("agent runtime is unavailable").with_code("AGENT_UNAVAILABLE")
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "agent runtime returned error");

        match serde_json::from_str::<NativeError>(&body) {
            Ok(native) => Err(native.into_api_error(status.as_u16())),
            Err(_) => Err(ApiError::from_status(status, format!("agent runtime returned {status}"))),
        }
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn query(&self, request: &QueryRequest, context: &RequestContext) -> Result<QueryResponse, ApiError> {
        let builder = self.post("query", request, context).timeout(self.request_timeout);
        let response = self.send(builder).await?;

        response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse agent runtime response");
            ApiError::internal("agent runtime sent an unreadable response").with_code("AGENT_BAD_RESPONSE")
        })
    }

    async fn query_stream(
        &self,
        request: &QueryRequest,
        context: &RequestContext,
    ) -> Result<AgentEventStream, ApiError> {
        let builder = self.post("query/stream", request, context);
        let response = self.send(builder).await?;

        let events = response
            .bytes_stream()
            .eventsource()
            .map(|result| match result {
                Ok(event) => {
                    let data = event.data.trim();
                    if data.is_empty() || data == "[DONE]" {
                        return None;
                    }

                    match NativeFrame::parse(data) {
                        Ok(frame) => Some(frame.into_result()),
                        Err(e) => {
                            tracing::debug!(error = %e, data = %data, "skipping unparseable agent event");
                            None
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "agent event stream interrupted");
                    Some(Err(
                        ApiError::service_unavailable("agent event stream interrupted").with_code("AGENT_STREAM_ERROR")
                    ))
                }
            })
            .filter_map(std::future::ready);

        Ok(Box::pin(events))
    }
}
