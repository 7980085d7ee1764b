use std::num::ParseIntError;
use std::str::FromStr;

use axum::extract::Query;
use axum::http::Uri;
use jiff::fmt::strtime;
use jiff::Timestamp;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryBindError {
    #[error("invalid value for field {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("unsupported type {kind} for field {field}")]
    UnsupportedFieldType { field: String, kind: String },

    #[error("malformed query string: {0}")]
    MalformedQuery(String),
}

/// Decoded query string, keeping every value in request order.
#[derive(Debug, Clone, Default)]
pub struct QueryValues {
    pairs: Vec<(String, String)>,
}

impl QueryValues {
    pub fn from_uri(uri: &Uri) -> Result<Self, QueryBindError> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map_err(|e| QueryBindError::MalformedQuery(e.body_text()))?;
        Ok(Self { pairs })
    }

    /// First value for `key`, treating an empty value as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Implemented by `#[derive(QueryParams)]`.
///
/// Fields whose key is absent or empty keep their current value, so callers
/// set defaults before populating.
pub trait FromQueryParams {
    fn populate_from(&mut self, params: &QueryValues) -> Result<(), QueryBindError>;
}

/// Populates `dst` from the query string of `uri`.
pub fn bind_query<T: FromQueryParams>(uri: &Uri, dst: &mut T) -> Result<(), QueryBindError> {
    let params = QueryValues::from_uri(uri)?;
    dst.populate_from(&params)
}

#[doc(hidden)]
pub fn parse_int<T>(field: &str, raw: &str) -> Result<T, QueryBindError>
where
    T: FromStr<Err = ParseIntError>,
{
    raw.parse::<T>()
        .map_err(|e| QueryBindError::InvalidFieldValue {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Parses an RFC 3339 date-time with a `Z` or `+HH:MM` offset.
#[doc(hidden)]
pub fn parse_timestamp(field: &str, raw: &str) -> Result<Timestamp, QueryBindError> {
    let invalid = |reason: String| QueryBindError::InvalidFieldValue {
        field: field.to_string(),
        reason,
    };

    let normalized = match raw.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None if has_numeric_offset(raw) => raw.to_string(),
        None => return Err(invalid(format!("{raw:?} is not an RFC 3339 date-time"))),
    };

    strtime::parse(RFC3339, &normalized)
        .and_then(|parsed| parsed.to_timestamp())
        .map_err(|e| invalid(e.to_string()))
}

fn has_numeric_offset(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let Some(offset) = bytes.len().checked_sub(6).map(|start| &bytes[start..]) else {
        return false;
    };
    matches!(offset[0], b'+' | b'-')
        && offset[1..3].iter().all(u8::is_ascii_digit)
        && offset[3] == b':'
        && offset[4..].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::QueryParams;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, QueryParams)]
    struct Paging {
        page: i32,
        limit: i32,
    }

    #[derive(Debug, Default, Deserialize, QueryParams)]
    struct Filter {
        email: String,
        #[query(rename = "since")]
        created_at: Option<Timestamp>,
        small: i8,
        #[serde(rename = "owner")]
        owner_id: Option<i64>,
        #[query(flatten)]
        paging: Paging,
        #[query(skip)]
        internal: String,
    }

    #[derive(Debug, Default, QueryParams)]
    struct WithTags {
        name: String,
        tags: Vec<String>,
    }

    mod wire {
        #[derive(Debug, Default)]
        pub struct Timestamp;
    }

    #[derive(Debug, Default, QueryParams)]
    struct WireFilter {
        since: Option<wire::Timestamp>,
    }

    fn bind<T: FromQueryParams + Default>(query: &str) -> Result<T, QueryBindError> {
        let uri: Uri = format!("/users?{query}").parse().unwrap();
        let mut dst = T::default();
        bind_query(&uri, &mut dst)?;
        Ok(dst)
    }

    #[test]
    fn test_binds_supported_fields() {
        let filter: Filter =
            bind("email=a%40b.com&since=2023-08-01T12:00:00Z&small=-5&owner=42&page=2&limit=10")
                .unwrap();

        assert_eq!(filter.email, "a@b.com");
        assert_eq!(
            filter.created_at,
            Some("2023-08-01T12:00:00Z".parse::<Timestamp>().unwrap())
        );
        assert_eq!(filter.small, -5);
        assert_eq!(filter.owner_id, Some(42));
        assert_eq!(filter.paging.page, 2);
        assert_eq!(filter.paging.limit, 10);
    }

    #[test]
    fn test_absent_and_empty_values_keep_defaults() {
        let filter: Filter = bind("email=&page=").unwrap();

        assert_eq!(filter.email, "");
        assert_eq!(filter.created_at, None);
        assert_eq!(filter.paging.page, 0);
    }

    #[test]
    fn test_first_value_wins() {
        let filter: Filter = bind("email=first&email=second").unwrap();
        assert_eq!(filter.email, "first");
    }

    #[test]
    fn test_skipped_field_is_not_settable() {
        let filter: Filter = bind("internal=hacked").unwrap();
        assert_eq!(filter.internal, "");
    }

    #[test]
    fn test_invalid_integer_names_field() {
        let err = bind::<Filter>("page=abc").unwrap_err();
        match err {
            QueryBindError::InvalidFieldValue { field, .. } => assert_eq!(field, "page"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_integer_width_is_enforced() {
        let err = bind::<Filter>("small=300").unwrap_err();
        assert!(matches!(
            err,
            QueryBindError::InvalidFieldValue { ref field, .. } if field == "small"
        ));
    }

    #[test]
    fn test_invalid_timestamp_names_field() {
        let err = bind::<Filter>("since=yesterday").unwrap_err();
        assert!(matches!(
            err,
            QueryBindError::InvalidFieldValue { ref field, .. } if field == "created_at"
        ));
    }

    #[test]
    fn test_timestamp_accepts_rfc3339() {
        let utc = parse_timestamp("at", "2023-08-01T12:00:00Z").unwrap();
        let offset = parse_timestamp("at", "2023-08-01T19:00:00+07:00").unwrap();
        let fraction = parse_timestamp("at", "2023-08-01T12:00:00.250Z").unwrap();

        assert_eq!(utc, offset);
        assert_eq!(utc.as_second(), 1_690_891_200);
        assert_eq!(fraction.subsec_millisecond(), 250);
    }

    #[test]
    fn test_timestamp_rejects_non_rfc3339_forms() {
        for raw in [
            "2023-08-01T12Z",
            "2023-08-01 12:00:00Z",
            "2023-08-01t12:00:00z",
            "2023-08-01T12:00:00+07",
            "2023-08-01T12:00:00",
            "2023-08-01",
        ] {
            let err = parse_timestamp("at", raw).unwrap_err();
            assert!(
                matches!(err, QueryBindError::InvalidFieldValue { ref field, .. } if field == "at"),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_unsupported_type_only_fails_when_present() {
        let ok: WithTags = bind("name=x").unwrap();
        assert_eq!(ok.name, "x");

        let err = bind::<WithTags>("name=x&tags=a").unwrap_err();
        assert_eq!(
            err,
            QueryBindError::UnsupportedFieldType {
                field: "tags".to_string(),
                kind: "Vec<String>".to_string(),
            }
        );
    }

    #[test]
    fn test_foreign_timestamp_type_is_unsupported() {
        let err = bind::<WireFilter>("since=2023-08-01T12:00:00Z").unwrap_err();
        assert_eq!(
            err,
            QueryBindError::UnsupportedFieldType {
                field: "since".to_string(),
                kind: "Option<wire::Timestamp>".to_string(),
            }
        );
    }

    #[test]
    fn test_query_values_from_iter() {
        let values: QueryValues = [("a", "1"), ("b", "")].into_iter().collect();
        assert_eq!(values.get("a"), Some("1"));
        assert_eq!(values.get("b"), None);
        assert_eq!(values.get("c"), None);
    }
}
