//! HTTP API gateway for ragdock.
//!
//! Exposes ingestion (raw text and file uploads), personal memories,
//! grounded question answering, session chat, collection stats and reset.
//!
//! Built on Axum.

pub mod api;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use ragdock_config::AppConfig;
use ragdock_rag::{RagService, SessionStore};

/// Shared application state for the gateway.
pub type SharedState = Arc<RagService>;

/// Build the Axum router with all routes and layers.
///
/// Layers applied:
/// - Request body limit (`gateway.max_upload_bytes`)
/// - CORS allowing any origin
/// - HTTP trace logging
pub fn build_router(state: SharedState, max_body_bytes: usize) -> Router {
    api::routes()
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Wire the pipeline from configuration.
///
/// Opens the collections, builds the configured backend and creates an
/// empty session store.
pub async fn build_service(config: &AppConfig) -> Result<RagService, Box<dyn std::error::Error>> {
    let provider = ragdock_providers::build_from_config(&config.backend);

    let collections = ragdock_store::open_collections(&config.store).await?;
    let sessions = Arc::new(SessionStore::new());
    Ok(RagService::new(config, provider, collections, sessions)?)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let service = Arc::new(build_service(&config).await?);
    if !service.backend_healthy().await {
        warn!(
            base_url = %config.backend.base_url,
            "Backend is not reachable yet; requests needing embeddings or chat will fail"
        );
    }

    let app = build_router(service, config.gateway.max_upload_bytes);

    info!(
        addr = %addr,
        provider = %config.backend.provider,
        chat_model = %config.backend.chat_model,
        embed_model = %config.backend.embed_model,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
