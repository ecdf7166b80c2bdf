mod adapter;
mod config;
mod errors;
mod intake;
mod interview;
mod llm_client;
mod models;
mod retry;
mod routes;
mod state;
mod store;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapter::llm::LlmInterviewer;
use crate::adapter::{InterviewAdapter, OfflineInterviewer, ResilientAdapter};
use crate::config::Config;
use crate::interview::Interviewer;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::blob::{BlobStore, FileBlobStore, RedisBlobStore};
use crate::store::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Persisted state: Redis when configured, a local directory otherwise
    let blobs: Arc<dyn BlobStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisBlobStore::connect(url).await?),
        None => Arc::new(FileBlobStore::open(&config.state_dir).await?),
    };
    let store = SessionStore::load(blobs).await;

    // AI service backend
    let backend: Arc<dyn InterviewAdapter> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!(
                "LLM client initialized (model: {}, role: {})",
                llm_client::MODEL,
                config.interview_role
            );
            Arc::new(LlmInterviewer::new(llm, config.interview_role.clone()))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, running with local fallbacks only");
            Arc::new(OfflineInterviewer)
        }
    };
    let adapter = ResilientAdapter::new(backend, config.retry_policy());

    let interviewer = Interviewer::new(store, adapter);
    let state = AppState {
        interviewer: interviewer.clone(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    interviewer.flush().await;
    info!("State flushed, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
