//! Axum extractors for STAC requests.
//!
//! - [`Endpoint`] - The public root URL used to build links
//! - [`SearchBody`] - A POST search body
//! - [`SearchQuery`] - A GET search query string

mod endpoint;
mod search_body;
mod search_query;

pub use endpoint::Endpoint;
pub use search_body::SearchBody;
pub use search_query::SearchQuery;
