//! Response writers.
//!
//! Handlers finish every request through [`write_ok`] or [`write_error`], so
//! all bodies share one envelope and every response is logged the same way.

mod error;

pub use error::{Classified, classify, error_message, write_error};

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::dto;
use crate::api::request::RequestContext;

/// Serializes `body` as JSON with `status`.
///
/// If serialization fails the client gets a plain-text 500 instead.
pub fn write_json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode response body");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

/// Writes `data` in a 200 success envelope carrying the request path and method.
pub fn write_ok<T: Serialize>(ctx: &RequestContext, data: T) -> Response {
    let status = StatusCode::OK;
    tracing::info!(
        code = status.as_u16(),
        path = ctx.path(),
        method = %ctx.method,
        "success response"
    );

    write_json(
        status,
        &dto::Response {
            code: status.as_u16(),
            data,
            meta: Some(dto::Meta {
                path: ctx.path().to_string(),
                method: ctx.method.to_string(),
            }),
        },
    )
}
