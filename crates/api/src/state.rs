use std::sync::Arc;

use academy_mux::provider::VideoProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: academy_db::DbPool,
    /// Server configuration (JWT, provider credentials, webhook secret).
    pub config: Arc<ServerConfig>,
    /// Outbound video provider client.
    pub video: Arc<dyn VideoProvider>,
}
