//! Page arithmetic shared by the query builder and list responses.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page number must be >= 1")]
    InvalidPage,

    #[error("limit must be > 0")]
    InvalidLimit,
}

/// Number of pages needed to show `total` items, `limit` per page.
pub fn total_page(total: i64, limit: i64) -> Result<i64, PaginationError> {
    if limit <= 0 {
        return Err(PaginationError::InvalidLimit);
    }
    Ok(total / limit + i64::from(total % limit != 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_total_page() {
        assert_eq!(total_page(0, 10), Ok(0));
        assert_eq!(total_page(1, 10), Ok(1));
        assert_eq!(total_page(10, 10), Ok(1));
        assert_eq!(total_page(11, 10), Ok(2));
        assert_eq!(total_page(25, 1), Ok(25));
    }

    #[test]
    fn test_total_page_near_i64_max() {
        assert_eq!(total_page(i64::MAX, 1), Ok(i64::MAX));
        assert_eq!(total_page(i64::MAX, i64::MAX), Ok(1));
        assert_eq!(total_page(i64::MAX, 2), Ok(i64::MAX / 2 + 1));
    }

    #[test]
    fn test_total_page_rejects_non_positive_limit() {
        assert_eq!(total_page(10, 0), Err(PaginationError::InvalidLimit));
        assert_eq!(total_page(10, -3), Err(PaginationError::InvalidLimit));
    }

    proptest! {
        #[test]
        fn prop_total_page_covers_all_items(total in 0i64..1_000_000, limit in 1i64..1_000) {
            let pages = total_page(total, limit).unwrap();
            prop_assert!(pages * limit >= total);
            prop_assert!(pages == 0 || (pages - 1) * limit < total);
        }
    }
}
