//! Elasticsearch backend implementation.
//!
//! Items and collections live in two indices (`items` and `collections` by
//! default). String properties are mapped as keywords, `geometry` as a
//! `geo_shape` and the STAC datetime properties as dates, so every
//! [`Clause`](crate::types::Clause) translates directly to Query DSL.
//!
//! Collection `properties` are merged into items when they are indexed
//! through [`ElasticsearchBackend::index_item`], not at query time. Items
//! written to the index by other tools are searched as stored, so a `query`
//! on a collection-level property such as `platform` only matches them if
//! they carry it themselves.
//!
//! # Example
//!
//! ```ignore
//! use satapi_search::backends::elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
//!
//! let config = ElasticsearchConfig {
//!     nodes: vec!["http://localhost:9200".to_string()],
//!     ..Default::default()
//! };
//! let backend = ElasticsearchBackend::new(config)?;
//! backend.ensure_indices().await?;
//! ```

mod backend;
mod ingest;
mod query_builder;
mod schema;
mod search_impl;

pub use backend::{ElasticsearchAuth, ElasticsearchBackend, ElasticsearchConfig};
pub use query_builder::{build_clause, build_search_body, build_sort};
