use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use relay_auth::{AuthError, KeyRing};
use relay_openai::error_response;

/// Header accepted as an alternative to `Authorization: Bearer`
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authenticate requests via API key
///
/// Public paths pass through untouched. Everything else needs a key that
/// matches the key ring; the resulting `ClientIdentity` is stored in the
/// request extensions.
pub async fn auth_middleware(
    keyring: Arc<KeyRing>,
    public_paths: Arc<[String]>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if is_public(path, &public_paths) {
        return next.run(request).await;
    }

    let Some(key) = presented_key(request.headers()) else {
        tracing::debug!(path = %path, "request without API key");
        return error_response(&AuthError::MissingKey);
    };

    match keyring.authenticate(key) {
        Ok(identity) => {
            tracing::debug!(client_id = %identity.client_id, "API key authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "API key authentication failed");
            error_response(&e)
        }
    }
}

/// Whether `path` is a public path or lies beneath one
///
/// Matching is per path segment, so `/health` does not cover `/healthz`.
fn is_public(path: &str, public_paths: &[String]) -> bool {
    public_paths.iter().any(|public| {
        path.strip_prefix(public.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || public.ends_with('/'))
    })
}

/// Key from `Authorization: Bearer` or, failing that, `x-api-key`
fn presented_key(headers: &http::HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    bearer
        .or_else(|| headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|key| !key.is_empty())
}
