//! Request-side helpers shared by handlers.
//!
//! - `query` - binding URL query parameters onto DTOs (`#[derive(QueryParams)]`)
//! - `body` - JSON body decoding from the buffered request body
//! - `context` - the [`RequestContext`] extractor used when writing responses

mod body;
mod context;
mod query;

pub use body::decode_json;
pub use context::RequestContext;
pub use macros::QueryParams;
pub use query::{
    FromQueryParams, QueryBindError, QueryValues, bind_query, parse_int, parse_timestamp,
};
