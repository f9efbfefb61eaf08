//! sat-api search engine
//!
//! This crate turns loosely-typed STAC item-search requests into deterministic
//! backend queries and turns raw backend results into contract-conformant
//! `FeatureCollection` pages.
//!
//! # Pipeline
//!
//! ```text
//! RawSearchRequest
//!     └── normalize ──► SearchRequest
//!             ├── filter ──► CompiledQuery
//!             └── sort   ──► SortSpec
//!                     └── pagination (backend I/O) ──► ResultPage + links
//!                             └── projection (per record)
//!                                     └── response ──► ResponsePage
//! ```
//!
//! Every stage except the pagination controller is a pure function. The
//! [`SearchEngine`] orchestrates them against a shared backend handle.
//!
//! # Backend Features
//!
//! - in-memory backend (always available), loadable from a directory of
//!   collection and item documents
//! - `elasticsearch` - Elasticsearch index backend
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use satapi_search::{SearchConfig, SearchEngine, RawSearchRequest};
//! use satapi_search::backends::memory::MemoryBackend;
//!
//! let backend = Arc::new(MemoryBackend::from_dir("./catalog")?);
//! let engine = SearchEngine::new(backend, SearchConfig::default());
//!
//! let raw = RawSearchRequest::from_query_string("collections=landsat-8-l1&limit=2");
//! let page = engine.search(&raw, None, "http://localhost:8080").await?;
//! ```

#![warn(missing_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod fields;
pub mod search;
pub mod types;

pub use config::SearchConfig;
pub use engine::SearchEngine;
pub use error::{BackendError, NotFoundError, SearchError, SearchResult, ValidationError};
pub use types::{
    CompiledQuery, Link, RawSearchRequest, ResponsePage, ResultPage, SearchRequest, SortSpec,
    Transport, Window,
};

pub use core::{Backend, BackendCapability, BackendKind, CatalogProvider, SearchBackend};
