//! Web server for depot.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::db::{Database, UserRepository};
use crate::file::BlobStore;
use crate::quota::QuotaPolicy;
use crate::{DepotError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the file API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    ///
    /// Initializes blob storage and ensures the bootstrap tenant user
    /// exists before any request can reference it.
    pub async fn new(config: &Config, db: Database) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| DepotError::Config(format!("invalid server address: {e}")))?;

        let store =
            BlobStore::new(&config.storage.path)?.with_max_blob_size(config.max_file_size_bytes());
        info!("Blob storage initialized at: {}", config.storage.path);

        let user = UserRepository::new(db.pool())
            .ensure(&config.tenant.email)
            .await?;
        info!("Tenant user ready: {} (id {})", user.email, user.id);

        let state = AppState::new(db, store, QuotaPolicy::from(&config.quota), user.id);

        Ok(Self {
            addr,
            state: Arc::new(state),
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// The application state (exposed for tests).
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Run the server until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state, &self.cors_origins);

        let listener = TcpListener::bind(self.addr).await?;
        info!("Web API listening on {}", self.addr);

        axum::serve(listener, router)
            .await
            .map_err(DepotError::Io)?;

        Ok(())
    }
}
