//! Backend traits.
//!
//! - [`Backend`] - identity, capabilities and health of an index
//! - [`SearchBackend`] - executes a compiled query for one window
//! - [`CatalogProvider`] - reads collections and single items
//!
//! # Example: Implementing a Backend
//!
//! ```ignore
//! use async_trait::async_trait;
//! use satapi_search::core::*;
//! use satapi_search::types::{CompiledQuery, ResultPage, SortSpec, Window};
//!
//! #[derive(Debug)]
//! struct EmptyBackend;
//!
//! #[async_trait]
//! impl SearchBackend for EmptyBackend {
//!     async fn search(
//!         &self,
//!         _query: &CompiledQuery,
//!         _sort: &SortSpec,
//!         _window: Window,
//!     ) -> Result<ResultPage, BackendError> {
//!         Ok(ResultPage::empty())
//!     }
//! }
//! ```

mod backend;
mod search;

pub use backend::{Backend, BackendCapability, BackendKind};
pub use search::{CatalogProvider, SearchBackend};
