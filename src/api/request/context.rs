use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Method, Uri};

use crate::api::middleware::{BufferedBody, RequestId};

/// Request facts needed to build and log a response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    /// Raw request body, empty when the body was not buffered
    pub body: Bytes,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Request body as text for logging.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            body: parts
                .extensions
                .get::<BufferedBody>()
                .map(|b| b.0.clone())
                .unwrap_or_default(),
            request_id: parts.extensions.get::<RequestId>().map(|id| id.0.clone()),
        })
    }
}
