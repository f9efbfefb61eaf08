//! The search engine entry point.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::config::SearchConfig;
use crate::core::{CatalogProvider, SearchBackend};
use crate::error::{BackendError, NotFoundError, SearchError, SearchResult};
use crate::search::{
    Projection, assemble, compile_filter, compile_sort, decorate_collection, decorate_item,
    fetch_page, normalize, page_links, plan_window, project,
};
use crate::types::{RawSearchRequest, ResponsePage};

/// Runs search requests through the pipeline against a shared backend.
///
/// The backend handle is created once and shared by every request; the
/// engine itself holds no per-request state and is cheap to clone.
pub struct SearchEngine<B> {
    backend: Arc<B>,
    config: SearchConfig,
}

impl<B> Clone for SearchEngine<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
        }
    }
}

impl<B> SearchEngine<B>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    /// Creates an engine over an initialized backend.
    pub fn new(backend: Arc<B>, config: SearchConfig) -> Self {
        Self { backend, config }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches items.
    ///
    /// `scope` is the collection id of a `/collections/{id}/items` request and
    /// `base_url` the public root of the API, used for every link.
    #[instrument(skip_all, fields(transport = %raw.transport, scope = scope.unwrap_or("")))]
    pub async fn search(
        &self,
        raw: &RawSearchRequest,
        scope: Option<&str>,
        base_url: &str,
    ) -> SearchResult<ResponsePage> {
        let request = normalize(raw, scope, &self.config)?;
        let query = compile_filter(&request)?;
        let sort = compile_sort(&request)?;
        let window = plan_window(&request, self.backend.max_result_window())?;

        if let Some(collection) = scope {
            self.require_collection(collection).await?;
        }

        let page = fetch_page(
            self.backend.as_ref(),
            &query,
            &sort,
            window,
            self.config.backend_timeout(),
        )
        .await
        .map_err(|e| self.backend_failure(e))?;

        debug!(
            returned = page.returned(),
            matched = page.matched.value,
            offset = window.offset,
            "Search completed"
        );

        let links = page_links(base_url, raw, &request, window, &page);
        let projection = Projection::compile(request.fields.as_ref());
        let matched = page.matched;
        let features = page
            .items
            .into_iter()
            .map(|mut item| {
                decorate_item(&mut item, base_url);
                project(item, projection.as_ref())
            })
            .collect();

        Ok(assemble(matched, features, &request, links))
    }

    /// Returns every collection.
    pub async fn collections(&self, base_url: &str) -> SearchResult<Vec<Value>> {
        let mut collections = self.call(self.backend.collections()).await?;
        for collection in &mut collections {
            decorate_collection(collection, base_url);
        }
        Ok(collections)
    }

    /// Returns one collection.
    pub async fn collection(&self, id: &str, base_url: &str) -> SearchResult<Value> {
        let mut collection = self.require_collection(id).await?;
        decorate_collection(&mut collection, base_url);
        Ok(collection)
    }

    /// Returns one item of a collection.
    pub async fn item(&self, collection: &str, id: &str, base_url: &str) -> SearchResult<Value> {
        let mut item = self
            .call(self.backend.item(collection, id))
            .await?
            .ok_or_else(|| NotFoundError::Item {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        decorate_item(&mut item, base_url);
        Ok(item)
    }

    /// Checks that the backend is serving queries.
    pub async fn health_check(&self) -> SearchResult<()> {
        self.call(self.backend.health_check()).await
    }

    async fn require_collection(&self, id: &str) -> SearchResult<Value> {
        self.call(self.backend.collection(id))
            .await?
            .ok_or_else(|| NotFoundError::Collection { id: id.to_string() }.into())
    }

    /// Runs a catalog call under the backend timeout.
    async fn call<T, F>(&self, future: F) -> SearchResult<T>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let timeout = self.config.backend_timeout();
        match tokio::time::timeout(timeout, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(self.backend_failure(e)),
            Err(_) => Err(self.backend_failure(BackendError::Timeout {
                backend_name: self.backend.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })),
        }
    }

    /// Logs backend detail; callers only see the generic description.
    fn backend_failure(&self, err: BackendError) -> SearchError {
        error!(backend = self.backend.name(), error = %err, "Search backend failed");
        SearchError::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::core::{Backend, BackendCapability, BackendKind};
    use crate::types::{CompiledQuery, ResultPage, SortSpec, Window};

    #[derive(Debug)]
    struct StalledBackend;

    #[async_trait]
    impl Backend for StalledBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Custom("stalled")
        }

        fn name(&self) -> &'static str {
            "stalled"
        }

        fn capabilities(&self) -> Vec<BackendCapability> {
            vec![BackendCapability::TermFilter]
        }

        async fn health_check(&self) -> Result<(), BackendError> {
            Err(BackendError::Unavailable {
                backend_name: "stalled".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for StalledBackend {
        async fn search(
            &self,
            _query: &CompiledQuery,
            _sort: &SortSpec,
            _window: Window,
        ) -> Result<ResultPage, BackendError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ResultPage::empty())
        }
    }

    #[async_trait]
    impl CatalogProvider for StalledBackend {
        async fn collection(&self, id: &str) -> Result<Option<Value>, BackendError> {
            Ok((id == "known").then(|| serde_json::json!({"id": "known"})))
        }

        async fn collections(&self) -> Result<Vec<Value>, BackendError> {
            Ok(vec![])
        }

        async fn item(&self, _collection: &str, _id: &str) -> Result<Option<Value>, BackendError> {
            Ok(None)
        }
    }

    fn engine() -> SearchEngine<StalledBackend> {
        SearchEngine::new(
            Arc::new(StalledBackend),
            SearchConfig::default().with_backend_timeout(Duration::from_millis(50)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_timeout() {
        let raw = RawSearchRequest::from_query_string("");
        let err = engine().search(&raw, None, "http://test").await.unwrap_err();
        match err {
            SearchError::Backend(e) => assert!(e.is_timeout()),
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validation_fails_before_io() {
        let raw = RawSearchRequest::from_query_string("limit=0");
        let err = engine().search(&raw, None, "http://test").await.unwrap_err();
        assert!(matches!(err, SearchError::Validation(ref v) if v.field == "limit"));
    }

    #[tokio::test]
    async fn test_unknown_scope_is_not_found() {
        let raw = RawSearchRequest::from_query_string("");
        let err = engine()
            .search(&raw, Some("missing"), "http://test")
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NotFound(NotFoundError::Collection { .. })));
    }

    #[tokio::test]
    async fn test_scope_mismatch_skips_backend() {
        let raw = RawSearchRequest::from_query_string("collections=other");
        let page = engine()
            .search(&raw, Some("known"), "http://test")
            .await
            .unwrap();
        assert!(page.features.is_empty());
        assert_eq!(page.context.matched, 0);
        assert!(page.link("next").is_none());
    }

    #[tokio::test]
    async fn test_unsupported_capability() {
        let raw = RawSearchRequest::from_query_string("bbox=-10,-10,10,10");
        let err = engine().search(&raw, None, "http://test").await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::Backend(BackendError::UnsupportedCapability { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_item_and_health() {
        let err = engine().item("known", "x", "http://test").await.unwrap_err();
        assert!(matches!(err, SearchError::NotFound(NotFoundError::Item { .. })));
        assert!(matches!(
            engine().health_check().await,
            Err(SearchError::Backend(_))
        ));
    }
}
