//! Response envelopes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success envelope: `{"code": 200, "data": ...}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Response<T> {
    #[schema(example = 200)]
    pub code: u16,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Request information optionally attached to a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Meta {
    pub path: String,
    pub method: String,
}

/// Error envelope: `{"code": 404, "message": "data not found"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = 404)]
    pub code: u16,
    #[schema(example = "data not found")]
    pub message: String,
}
