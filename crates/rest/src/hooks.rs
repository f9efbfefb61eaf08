//! Request and response hooks around the search handlers.
//!
//! A [`PreHook`] sees every search request before it is normalized and may
//! rewrite it (for example to inject a default collection or strip a
//! parameter). A [`PostHook`] sees the JSON envelope of every search response
//! and may rewrite it (for example to sign asset URLs).
//!
//! A hook that fails turns the request into a generic
//! `500 Internal Server Error`; its message is only logged.

use std::sync::Arc;

use async_trait::async_trait;
use satapi_search::RawSearchRequest;
use serde_json::Value;
use thiserror::Error;

/// Error returned by a hook.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct HookError {
    /// Diagnostic message, logged but never sent to clients.
    pub message: String,
}

impl HookError {
    /// Creates a hook error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A search request as seen by a [`PreHook`].
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    /// The request parameters.
    pub raw: RawSearchRequest,
    /// Collection id from the path of `/collections/{id}/items`.
    pub scope: Option<String>,
    /// Public root URL used for links.
    pub endpoint: String,
}

/// Transforms a search request before it reaches the engine.
#[async_trait]
pub trait PreHook: Send + Sync {
    /// Returns the (possibly rewritten) request.
    async fn before_search(&self, request: RequestEnvelope) -> Result<RequestEnvelope, HookError>;
}

/// Transforms the JSON envelope of a search response.
#[async_trait]
pub trait PostHook: Send + Sync {
    /// Returns the (possibly rewritten) response body.
    async fn after_search(&self, response: Value) -> Result<Value, HookError>;
}

/// The hooks installed on a server.
#[derive(Clone, Default)]
pub struct Hooks {
    pre: Option<Arc<dyn PreHook>>,
    post: Option<Arc<dyn PostHook>>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

impl Hooks {
    /// No hooks.
    pub fn none() -> Self {
        Self::default()
    }

    /// Installs a pre-search hook.
    pub fn with_pre(mut self, hook: impl PreHook + 'static) -> Self {
        self.pre = Some(Arc::new(hook));
        self
    }

    /// Installs a post-search hook.
    pub fn with_post(mut self, hook: impl PostHook + 'static) -> Self {
        self.post = Some(Arc::new(hook));
        self
    }

    /// Runs the pre-search hook, if any.
    pub async fn before_search(
        &self,
        request: RequestEnvelope,
    ) -> Result<RequestEnvelope, HookError> {
        match &self.pre {
            Some(hook) => hook.before_search(request).await,
            None => Ok(request),
        }
    }

    /// Runs the post-search hook, if any.
    pub async fn after_search(&self, response: Value) -> Result<Value, HookError> {
        match &self.post {
            Some(hook) => hook.after_search(response).await,
            None => Ok(response),
        }
    }
}
