//! HTTP server for Relay
//!
//! Assembles the OpenAI-compatible routes with health, authentication,
//! request context and tracing middleware, and drains in-flight sessions
//! before shutting down.

mod auth;
mod health;
mod request_context;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::Router;
use relay_auth::KeyRing;
use relay_config::{AuthConfig, Config};
use relay_core::ShutdownManager;
use relay_openai::{AgentClient, HttpAgentClient, OpenAiState};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub use auth::API_KEY_HEADER;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    sessions: ShutdownManager,
    drain_timeout: Duration,
}

impl Server {
    /// Build the server from configuration, talking to the configured
    /// agent runtime over HTTP
    ///
    /// # Errors
    ///
    /// Returns an error if the agent client, model mapping, or key ring
    /// cannot be built
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let agent = Arc::new(HttpAgentClient::new(&config.agent)?);
        Self::with_agent(config, agent)
    }

    /// Build the server around an existing agent client
    ///
    /// # Errors
    ///
    /// Returns an error if the model mapping or key ring is invalid
    pub fn with_agent(config: &Config, agent: Arc<dyn AgentClient>) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

        let sessions = ShutdownManager::new();
        let openai_state =
            OpenAiState::new(&config.openai, agent, sessions.clone()).context("invalid openai.models mapping")?;

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // OpenAI-compatible routes
        app = app.merge(relay_openai::openai_router(openai_state));

        // Apply middleware layers (innermost first)

        // Request context (innermost, runs just before handlers)
        app = app.layer(axum::middleware::from_fn(request_context::request_context_middleware));

        // API key authentication
        if let Some(ref auth_config) = config.auth
            && auth_config.enabled
        {
            let keyring = Arc::new(keyring(auth_config)?);
            let public_paths: Arc<[String]> = auth_config.public_paths.clone().into();
            tracing::info!(keys = keyring.len(), "API key authentication enabled");

            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let keyring = Arc::clone(&keyring);
                let public_paths = Arc::clone(&public_paths);
                async move { auth::auth_middleware(keyring, public_paths, req, next).await }
            }));
        }

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
            sessions,
            drain_timeout: config.server.drain_timeout(),
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the listen address
    #[must_use]
    pub const fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Session tracker shared with the handlers
    #[must_use]
    pub fn sessions(&self) -> ShutdownManager {
        self.sessions.clone()
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Once the cancellation token fires, new sessions are refused and
    /// in-flight ones get up to the drain timeout to finish before the
    /// listener closes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        let sessions = self.sessions;
        let drain_timeout = self.drain_timeout;

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
                drain(&sessions, drain_timeout).await;
            })
            .await?;

        Ok(())
    }
}

/// Refuse new sessions and wait for in-flight ones
async fn drain(sessions: &ShutdownManager, timeout: Duration) {
    sessions.initiate_shutdown();

    if sessions.wait_for_drain(timeout).await {
        tracing::info!("all sessions drained");
    } else {
        tracing::warn!(
            remaining = sessions.active_sessions(),
            timeout_seconds = timeout.as_secs(),
            "drain timed out, closing with sessions in flight"
        );
    }
}

fn keyring(config: &AuthConfig) -> anyhow::Result<KeyRing> {
    let keys = config
        .keys
        .iter()
        .map(|key| {
            key.digest()
                .map(|hash| (key.name.clone(), hash))
                .with_context(|| format!("auth key '{}' is not a SHA-256 hex digest", key.name))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(KeyRing::new(keys))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use relay_auth::hash_api_key;
    use relay_config::ApiKeyConfig;
    use relay_core::{ApiError, RequestContext};
    use relay_openai::AgentEventStream;
    use relay_openai::types::{ContentBlock, QueryRequest, QueryResponse};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    /// Records the owner hash it was called with
    #[derive(Default)]
    struct EchoAgent {
        owners: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl AgentClient for EchoAgent {
        async fn query(&self, _request: &QueryRequest, context: &RequestContext) -> Result<QueryResponse, ApiError> {
            self.owners.lock().unwrap().push(context.owner_hash().map(str::to_owned));
            Ok(QueryResponse {
                content: vec![ContentBlock::text("ok")],
                ..QueryResponse::default()
            })
        }

        async fn query_stream(
            &self,
            _request: &QueryRequest,
            _context: &RequestContext,
        ) -> Result<AgentEventStream, ApiError> {
            Err(ApiError::service_unavailable("not scripted"))
        }
    }

    fn config_with_auth() -> Config {
        Config {
            auth: Some(AuthConfig {
                enabled: true,
                public_paths: vec!["/health".to_owned()],
                keys: vec![ApiKeyConfig {
                    name: "ci".to_owned(),
                    hash: hash_api_key("sk-test").to_string(),
                }],
            }),
            ..Config::default()
        }
    }

    fn chat_request(key: Option<&str>) -> Request<Body> {
        let mut builder = Request::post("/v1/chat/completions").header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }
        builder
            .body(Body::from(
                json!({"model": "gpt-4", "messages": [{"role": "user", "content": "Hi"}]}).to_string(),
            ))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let router = Server::with_agent(&config_with_auth(), Arc::new(EchoAgent::default()))
            .unwrap()
            .into_router();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_key_is_rejected_with_envelope() {
        let router = Server::with_agent(&config_with_auth(), Arc::new(EchoAgent::default()))
            .unwrap()
            .into_router();

        let response = router.oneshot(chat_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"error": {"type": "authentication_error", "message": "missing API key", "code": "MISSING_API_KEY"}})
        );
    }

    #[tokio::test]
    async fn wrong_key_is_rejected() {
        let router = Server::with_agent(&config_with_auth(), Arc::new(EchoAgent::default()))
            .unwrap()
            .into_router();

        let response = router.oneshot(chat_request(Some("sk-wrong"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_API_KEY");
    }

    #[tokio::test]
    async fn valid_key_reaches_agent_with_owner_hash() {
        let agent = Arc::new(EchoAgent::default());
        let router = Server::with_agent(&config_with_auth(), agent.clone()).unwrap().into_router();

        let response = router.oneshot(chat_request(Some("sk-test"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            agent.owners.lock().unwrap().as_slice(),
            [Some(hash_api_key("sk-test").to_string())]
        );
    }

    #[tokio::test]
    async fn auth_disabled_passes_without_owner() {
        let agent = Arc::new(EchoAgent::default());
        let router = Server::with_agent(&Config::default(), agent.clone()).unwrap().into_router();

        let response = router.oneshot(chat_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(agent.owners.lock().unwrap().as_slice(), [None]);
    }

    #[tokio::test]
    async fn drain_refuses_new_sessions() {
        let server = Server::with_agent(&Config::default(), Arc::new(EchoAgent::default())).unwrap();
        let sessions = server.sessions();
        let router = server.into_router();

        drain(&sessions, Duration::from_secs(1)).await;

        let response = router.oneshot(chat_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"]["code"], "SERVICE_SHUTTING_DOWN");
    }

    #[test]
    fn duplicate_internal_models_fail_startup() {
        let config = Config {
            openai: relay_config::OpenAiConfig {
                models: [("a", "sonnet"), ("b", "sonnet")]
                    .into_iter()
                    .map(|(e, i)| (e.to_owned(), i.to_owned()))
                    .collect(),
                ..relay_config::OpenAiConfig::default()
            },
            ..Config::default()
        };

        assert!(Server::with_agent(&config, Arc::new(EchoAgent::default())).is_err());
    }
}
