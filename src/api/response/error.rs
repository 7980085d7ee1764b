use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use validator::ValidationErrors;

use crate::api::dto::ErrorResponse;
use crate::api::request::RequestContext;
use crate::api::response::write_json;
use crate::error::AppError;
use crate::utils::validate::translate_errors;

/// Outcome of classifying an error chain.
pub struct Classified<'a> {
    pub status: StatusCode,
    /// Deepest cause beneath the classification
    pub root_cause: &'a (dyn StdError + 'static),
}

/// Finds the outermost [`AppError`] in the chain of `err`.
///
/// Errors without a classification are treated as internal.
pub fn classify(err: &anyhow::Error) -> Classified<'_> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AppError>())
        .map(|app| Classified {
            status: app.status_code(),
            root_cause: app.root_cause(),
        })
        .unwrap_or_else(|| Classified {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            root_cause: err.root_cause(),
        })
}

/// Client facing message for a classified error.
///
/// Server errors never leak their cause. Validation failures of a bad
/// request are listed one per rule, comma separated.
pub fn error_message(classified: &Classified<'_>) -> String {
    if classified.status.is_server_error() {
        return "internal server error".to_string();
    }

    if classified.status == StatusCode::BAD_REQUEST {
        if let Some(errors) = classified.root_cause.downcast_ref::<ValidationErrors>() {
            return translate_errors(errors).join(",");
        }
    }

    classified.root_cause.to_string()
}

/// Logs `err` with the request and writes the matching error envelope.
pub fn write_error(ctx: &RequestContext, err: anyhow::Error) -> Response {
    let classified = classify(&err);
    let message = error_message(&classified);
    let code = classified.status.as_u16();

    tracing::error!(
        code,
        path = ctx.path(),
        method = %ctx.method,
        request = %ctx.body_text(),
        error = %format!("{err:#}"),
        "error response"
    );

    write_json(classified.status, &ErrorResponse { code, message })
}
