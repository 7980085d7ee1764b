//! Pagination-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::request::QueryParams;
use crate::utils::pagination::{PaginationError, total_page};

/// Largest accepted page size.
pub const MAX_LIMIT: i32 = 100;

/// Page selection supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, QueryParams, ToSchema)]
pub struct Pagination {
    /// Page number (1-based)
    #[schema(minimum = 1, example = 1)]
    pub page: i32,

    /// Number of items per page (max 100)
    #[schema(minimum = 1, maximum = 100, example = 20)]
    pub limit: i32,
}

impl Pagination {
    /// Raises values below 1 to 1 and caps `limit` at [`MAX_LIMIT`].
    pub fn normalize(&mut self) {
        if self.page < 1 {
            self.page = 1;
        }
        if self.limit < 1 {
            self.limit = 1;
        }
        if self.limit > MAX_LIMIT {
            self.limit = MAX_LIMIT;
        }
    }
}

/// Pagination metadata of a list response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PaginationResponse {
    #[schema(example = 1)]
    pub page: i32,

    #[schema(example = 5)]
    pub total_page: i64,

    #[schema(example = 20)]
    pub limit: i32,

    #[schema(example = 100)]
    pub total: i64,
}

impl PaginationResponse {
    pub fn new(pagination: Pagination, total: i64) -> Result<Self, PaginationError> {
        Ok(Self {
            page: pagination.page,
            total_page: total_page(total, i64::from(pagination.limit))?,
            limit: pagination.limit,
            total,
        })
    }
}

/// A page of items together with its pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_defaults() {
        let mut pagination = Pagination::default();
        pagination.normalize();
        assert_eq!(pagination, Pagination { page: 1, limit: 1 });
    }

    #[test]
    fn test_normalize_caps_limit() {
        let mut pagination = Pagination {
            page: 3,
            limit: 500,
        };
        pagination.normalize();
        assert_eq!(pagination, Pagination { page: 3, limit: 100 });
    }

    #[test]
    fn test_pagination_response() {
        let response = PaginationResponse::new(Pagination { page: 2, limit: 10 }, 25).unwrap();
        assert_eq!(response.total_page, 3);
        assert_eq!(response.page, 2);
        assert_eq!(response.limit, 10);
        assert_eq!(response.total, 25);
    }

    #[test]
    fn test_pagination_response_rejects_zero_limit() {
        let result = PaginationResponse::new(Pagination { page: 1, limit: 0 }, 25);
        assert_eq!(result, Err(PaginationError::InvalidLimit));
    }

    #[test]
    fn test_list_response_json_shape() {
        let list = ListResponse {
            data: vec![1, 2],
            pagination: PaginationResponse::new(Pagination { page: 1, limit: 2 }, 2).unwrap(),
        };
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [1, 2],
                "pagination": {"page": 1, "total_page": 1, "limit": 2, "total": 2}
            })
        );
    }

    proptest! {
        #[test]
        fn prop_normalize_bounds(page in any::<i32>(), limit in any::<i32>()) {
            let mut pagination = Pagination { page, limit };
            pagination.normalize();

            prop_assert!(pagination.page >= 1);
            prop_assert!((1..=MAX_LIMIT).contains(&pagination.limit));
            if page >= 1 {
                prop_assert_eq!(pagination.page, page);
            }
            if (1..=MAX_LIMIT).contains(&limit) {
                prop_assert_eq!(pagination.limit, limit);
            }
        }

        #[test]
        fn prop_normalize_is_idempotent(page in any::<i32>(), limit in any::<i32>()) {
            let mut once = Pagination { page, limit };
            once.normalize();
            let mut twice = once;
            twice.normalize();
            prop_assert_eq!(once, twice);
        }
    }
}
