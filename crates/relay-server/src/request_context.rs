use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use relay_core::{ClientIdentity, RequestContext};

/// Middleware that constructs a `RequestContext` from the incoming request
///
/// Lifts the identity left by the auth middleware, if any, into the
/// context handed to handlers.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let context = RequestContext {
        parts: parts.clone(),
        client_identity: parts.extensions.get::<ClientIdentity>().cloned(),
    };

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(context);

    next.run(request).await
}
