//! User-related DTOs for API requests and responses.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::Pagination;
use crate::api::request::QueryParams;
use crate::models::User;

// ============================================================================
// Request DTOs
// ============================================================================

/// Query constraints for listing users.
#[derive(Debug, Clone, Default, QueryParams)]
pub struct UserFilter {
    /// Substring of the email address
    pub email: String,
    /// Only users created at or after this instant
    pub created_at: Option<Timestamp>,
    #[query(flatten)]
    pub pagination: Pagination,
}

/// Request body for creating or updating a user.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUpdateUserRequest {
    #[validate(required, email)]
    #[schema(format = "email", example = "someone@example.com")]
    pub email: Option<String>,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    pub created_by: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<Timestamp>,
    pub updated_by: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at.to_jiff(),
            created_by: user.created_by,
            updated_at: user.updated_at.map(|t| t.to_jiff()),
            updated_by: user.updated_by,
        }
    }
}
