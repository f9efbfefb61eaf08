//! The search pipeline stages.
//!
//! - [`normalize`] - folds either transport encoding into a [`SearchRequest`](crate::types::SearchRequest)
//! - [`filter`] - compiles filter dimensions into a [`CompiledQuery`](crate::types::CompiledQuery)
//! - [`sort`] - compiles sort keys with the id tie-break
//! - [`pagination`] - windows, the backend round-trip, and navigation links
//! - [`projection`] - include/exclude field selection per record
//! - [`response`] - the final `FeatureCollection` envelope
//!
//! Only [`pagination::fetch_page`] performs I/O.

pub mod filter;
pub mod normalize;
pub mod pagination;
pub mod projection;
pub mod response;
pub mod sort;

pub use filter::compile_filter;
pub use normalize::normalize;
pub use pagination::{fetch_page, page_links, plan_window};
pub use projection::{MANDATORY_FIELDS, Projection, project};
pub use response::{assemble, decorate_collection, decorate_item};
pub use sort::compile_sort;
