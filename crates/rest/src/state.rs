//! Application state for the STAC API.
//!
//! Holds the search engine (and through it the backend handle created at
//! start-up), the server configuration and the installed hooks.

use std::sync::Arc;

use satapi_search::{CatalogProvider, SearchBackend, SearchEngine};

use crate::config::ServerConfig;
use crate::hooks::Hooks;

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `B` - The search backend type
///
/// # Example
///
/// ```rust,ignore
/// use satapi_rest::{AppState, ServerConfig};
/// use satapi_search::{SearchEngine, backends::memory::MemoryBackend};
/// use std::sync::Arc;
///
/// let config = ServerConfig::default();
/// let engine = SearchEngine::new(Arc::new(MemoryBackend::new()), config.search_config());
/// let state = AppState::new(engine, config);
/// ```
pub struct AppState<B> {
    /// The search engine.
    engine: SearchEngine<B>,

    /// Server configuration.
    config: Arc<ServerConfig>,

    /// Pre- and post-search hooks.
    hooks: Hooks,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            config: Arc::clone(&self.config),
            hooks: self.hooks.clone(),
        }
    }
}

impl<B> AppState<B>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    /// Creates a new AppState with no hooks.
    pub fn new(engine: SearchEngine<B>, config: ServerConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
            hooks: Hooks::none(),
        }
    }

    /// Replaces the installed hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Returns the search engine.
    pub fn engine(&self) -> &SearchEngine<B> {
        &self.engine
    }

    /// Returns the backend name.
    pub fn backend_name(&self) -> &'static str {
        self.engine.backend().name()
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the installed hooks.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }
}
