//! Where-clause construction for user listings.

use diesel::pg::Pg;
use diesel::query_builder::BoxedSqlQuery;
use diesel::sql_types::{Text, Timestamptz};
use jiff::Timestamp;
use jiff_diesel::ToDiesel;

use crate::api::dto::UserFilter;

/// A bind value of a dynamic where clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Text(String),
    Timestamp(Timestamp),
}

impl FilterArg {
    /// Binds this value as the next `$n` of `query`.
    pub fn bind<'f, Q>(self, query: BoxedSqlQuery<'f, Pg, Q>) -> BoxedSqlQuery<'f, Pg, Q> {
        match self {
            FilterArg::Text(value) => query.bind::<Text, _>(value),
            FilterArg::Timestamp(value) => query.bind::<Timestamptz, _>(value.to_diesel()),
        }
    }
}

/// Builds ` WHERE ...` with `?` placeholders for the set filter fields.
///
/// Returns an empty clause when no field is set.
pub fn filter_user(filter: &UserFilter) -> (String, Vec<FilterArg>) {
    let mut conditions = Vec::new();
    let mut args = Vec::new();

    if !filter.email.is_empty() {
        conditions.push("email LIKE '%' || ? || '%'");
        args.push(FilterArg::Text(filter.email.clone()));
    }

    if let Some(created_at) = filter.created_at {
        conditions.push("created_at >= ?");
        args.push(FilterArg::Timestamp(created_at));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    (clause, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        let (clause, args) = filter_user(&UserFilter::default());
        assert_eq!(clause, "");
        assert!(args.is_empty());
    }

    #[test]
    fn test_email_only() {
        let filter = UserFilter {
            email: "example".to_string(),
            ..Default::default()
        };
        let (clause, args) = filter_user(&filter);
        assert_eq!(clause, " WHERE email LIKE '%' || ? || '%'");
        assert_eq!(args, vec![FilterArg::Text("example".to_string())]);
    }

    #[test]
    fn test_email_and_created_at() {
        let created_at: Timestamp = "2024-05-01T00:00:00Z".parse().unwrap();
        let filter = UserFilter {
            email: "a@b.com".to_string(),
            created_at: Some(created_at),
            ..Default::default()
        };
        let (clause, args) = filter_user(&filter);
        assert_eq!(
            clause,
            " WHERE email LIKE '%' || ? || '%' AND created_at >= ?"
        );
        assert_eq!(
            args,
            vec![
                FilterArg::Text("a@b.com".to_string()),
                FilterArg::Timestamp(created_at)
            ]
        );
    }
}
