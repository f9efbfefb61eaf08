//! sat-api server
//!
//! Serves a STAC API over a search backend selected at start-up.

use clap::Parser;
use satapi_rest::{BackendMode, ServerConfig, create_app_with_config, init_logging};
use satapi_search::backends::memory::MemoryBackend;
use tracing::{error, info, warn};

/// Creates the in-memory backend, loading the catalog directory if one is
/// configured.
fn create_memory_backend(config: &ServerConfig) -> anyhow::Result<MemoryBackend> {
    let Some(dir) = config.catalog_dir.as_deref() else {
        warn!("No catalog directory configured, serving an empty catalog");
        return Ok(MemoryBackend::new());
    };

    info!(catalog_dir = %dir, "Loading catalog into memory backend");
    let backend = MemoryBackend::from_dir(dir)?;
    if backend.is_empty() {
        warn!(catalog_dir = %dir, "Catalog directory holds no items");
    }
    Ok(backend)
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        backend = %config.backend,
        base_url = config.base_url().unwrap_or("(derived from request)"),
        "Starting sat-api"
    );

    match config.backend {
        BackendMode::Memory => start_memory(config).await,
        BackendMode::Elasticsearch => start_elasticsearch(config).await,
    }
}

/// Starts the server with the in-memory backend.
async fn start_memory(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_memory_backend(&config)?;
    info!(
        collections = backend.collection_count(),
        items = backend.len(),
        "Memory backend ready"
    );
    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}

/// Starts the server with the Elasticsearch backend.
#[cfg(feature = "elasticsearch")]
async fn start_elasticsearch(config: ServerConfig) -> anyhow::Result<()> {
    use satapi_search::CatalogProvider;
    use satapi_search::backends::elasticsearch::{
        ElasticsearchAuth, ElasticsearchBackend, ElasticsearchConfig,
    };

    let auth = match (
        &config.elasticsearch_username,
        &config.elasticsearch_password,
    ) {
        (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };

    let nodes = config.elasticsearch_node_list();
    let es_config = ElasticsearchConfig {
        nodes: nodes.clone(),
        items_index: config.elasticsearch_items_index.clone(),
        collections_index: config.elasticsearch_collections_index.clone(),
        request_timeout_ms: config.backend_timeout.saturating_mul(1000),
        auth,
        ..Default::default()
    };

    info!(
        nodes = ?nodes,
        items_index = %es_config.items_index,
        collections_index = %es_config.collections_index,
        "Initializing Elasticsearch backend"
    );

    let backend = ElasticsearchBackend::new(es_config)?;
    backend.ensure_indices().await?;

    if config.catalog_dir.is_some() {
        let catalog = create_memory_backend(&config)?;
        for collection in catalog.collections().await? {
            backend.index_collection(&collection).await?;
        }
        for item in catalog.items() {
            backend.index_item(&item).await?;
        }
        info!(items = catalog.len(), "Indexed catalog directory");
    }

    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}

/// Fallback when the elasticsearch feature is not enabled.
#[cfg(not(feature = "elasticsearch"))]
async fn start_elasticsearch(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The elasticsearch backend requires the 'elasticsearch' feature. \
         Build with: cargo build -p satapi --features elasticsearch"
    )
}
