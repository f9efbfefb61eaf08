//! HTTP request handlers for the STAC API.
//!
//! - [`catalog`] - Landing page, conformance classes and the API description
//! - [`collections`] - Collection listing and single collection/item reads
//! - [`search`] - Item search over `/search` and `/collections/{id}/items`
//! - [`health`] - Health check endpoint

pub mod catalog;
pub mod collections;
pub mod health;
pub mod search;

pub use catalog::{api_handler, conformance_handler, landing_handler};
pub use collections::{collection_handler, collections_handler, item_handler};
pub use health::health_handler;
pub use search::{
    items_get_handler, items_post_handler, not_found_handler, search_get_handler,
    search_post_handler,
};
