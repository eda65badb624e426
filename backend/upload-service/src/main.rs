use std::sync::Arc;

use anyhow::Context;
use shared::observability::{init_logging, LogConfig};
use tokio::net::TcpListener;

mod config;
mod error;
mod handlers;
mod routes;
mod storage;

use config::Config;
use storage::{s3_client::S3ObjectStore, PublicUrl, StorageClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(LogConfig::from_env("upload-service")?)?;

    tracing::info!("Starting Upload Service...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let s3 = S3ObjectStore::connect(&config.storage)
        .await
        .context("Failed to create S3 client")?;
    let public_url = PublicUrl::from_config(&config.storage, s3.region());
    tracing::info!(
        bucket = %s3.bucket(),
        region = %s3.region(),
        public_url = ?public_url,
        "S3 client initialized successfully"
    );

    let state = AppState {
        storage: Arc::new(StorageClient::new(Arc::new(s3), public_url)),
    };

    let app = routes::create_router(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Upload Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
