//! Query execution and catalog reads.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;
use crate::types::{CompiledQuery, ResultPage, SortSpec, Window};

use super::Backend;

/// Executes compiled item searches.
#[async_trait]
pub trait SearchBackend: Backend {
    /// Returns the records of `window` in `sort` order, plus the number of
    /// records matching `query`.
    async fn search(
        &self,
        query: &CompiledQuery,
        sort: &SortSpec,
        window: Window,
    ) -> Result<ResultPage, BackendError>;
}

/// Reads collection documents and single items.
#[async_trait]
pub trait CatalogProvider: Backend {
    /// Returns the collection with the given id.
    async fn collection(&self, id: &str) -> Result<Option<Value>, BackendError>;

    /// Returns every collection, ordered by id.
    async fn collections(&self) -> Result<Vec<Value>, BackendError>;

    /// Returns one item of a collection.
    async fn item(&self, collection: &str, id: &str) -> Result<Option<Value>, BackendError>;
}
