use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use recipebook_store::{BlobStore, DocumentStore, FsBlobStore, InMemoryBlobStore, InMemoryDocumentStore};

use crate::app::AppState;
use crate::auth::{AuthProvider, StaticTokenAuth};
use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;

/// Recipe Book HTTP server.
pub struct RecipeBookServer {
    config: ServerConfig,
    state: AppState,
}

impl RecipeBookServer {
    /// Serve over the given stores, authenticating with the configured tokens.
    pub fn new(
        config: ServerConfig,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let auth: Arc<dyn AuthProvider> = Arc::new(StaticTokenAuth::new(config.tokens.clone()));
        let state = AppState::new(documents, blobs, auth, config.max_image_bytes);
        Self { config, state }
    }

    /// In-memory documents and the blob store `config` asks for.
    pub fn in_memory(config: ServerConfig) -> Self {
        let blobs = blob_store(&config);
        Self::new(config, Arc::new(InMemoryDocumentStore::new()), blobs)
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.state.auth = auth;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.enable_cors)
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("Recipe Book server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Recipe Book server stopped");
        Ok(())
    }
}

/// Files under `blob_root` when set, memory otherwise.
pub fn blob_store(config: &ServerConfig) -> Arc<dyn BlobStore> {
    match &config.blob_root {
        Some(root) => Arc::new(FsBlobStore::new(root.clone(), config.blob_base_url.clone())),
        None => Arc::new(InMemoryBlobStore::with_base_url(config.blob_base_url.clone())),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
