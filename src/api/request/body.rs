use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// Decodes a JSON request body, classifying malformed input as a bad request.
///
/// The bytes come from the buffered body, so the request stays readable for
/// error logging afterwards.
pub fn decode_json<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body).map_err(AppError::bad_request)
}
