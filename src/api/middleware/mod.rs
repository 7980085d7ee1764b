//! Middleware components for request processing.
//!
//! This module contains middleware for request ID tracking, request/response
//! logging and request body buffering.

mod logging;
mod request_body;
mod request_id;

pub use logging::logging_middleware;
pub use request_body::{BufferedBody, MAX_BODY_BYTES, buffer_body_middleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
