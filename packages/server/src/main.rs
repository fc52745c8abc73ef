use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use catalog_server::config::{AppConfig, CorsConfig, StorageDriver};
use catalog_server::database::init_db;
use catalog_server::state::AppState;
use common::storage::BlobStore;
use common::storage::filesystem::FilesystemBlobStore;
use common::storage::memory::MemoryBlobStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(host = %config.server.host, port = config.server.port, "Loaded configuration");

    let db = init_db(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to initialize database")?;

    let blob_store: Arc<dyn BlobStore> = match config.storage.driver {
        StorageDriver::Filesystem => Arc::new(
            FilesystemBlobStore::new(config.storage.root.clone().into(), config.storage.max_upload_size)
                .await
                .context("Failed to initialize blob storage")?,
        ),
        StorageDriver::Memory => Arc::new(MemoryBlobStore::new()),
    };
    info!(driver = ?config.storage.driver, root = %config.storage.root, "Blob storage ready");

    let cors = build_cors_layer(&config.server.cors)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config: Arc::new(config),
        blob_store,
    };
    let app = catalog_server::build_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors_layer(config: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let origin = if config.allow_origins.is_empty() || config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins = config
            .allow_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{o}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age)))
}
