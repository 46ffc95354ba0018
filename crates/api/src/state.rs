use std::sync::Arc;

use mediaboard_core::storage::StorageRoot;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mediaboard_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upload directory that stored file paths resolve against.
    pub storage: Arc<StorageRoot>,
}

impl AppState {
    pub fn new(pool: mediaboard_db::DbPool, config: ServerConfig) -> Self {
        let storage = Arc::new(StorageRoot::new(config.upload_dir.clone()));
        Self {
            pool,
            config: Arc::new(config),
            storage,
        }
    }
}
