//! Request body buffering.
//!
//! Handlers decode JSON from the buffered bytes, and the error writer logs
//! the same bytes, so reading the body never consumes it for later stages.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Upper bound on a buffered request body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The full request body, stored in request extensions.
#[derive(Clone, Debug, Default)]
pub struct BufferedBody(pub Bytes);

/// Reads the body once, stores a copy in extensions and re-attaches it.
pub async fn buffer_body_middleware(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    parts.extensions.insert(BufferedBody(bytes.clone()));
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
