//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `user` - user filter, request and response DTOs
//! - `pagination` - pagination input and list envelopes
//! - `response` - success and error envelopes

mod pagination;
mod response;
mod user;

pub use pagination::{ListResponse, Pagination, PaginationResponse};
pub use response::{ErrorResponse, Meta, Response};
pub use user::{CreateUpdateUserRequest, UserFilter, UserResponse};
