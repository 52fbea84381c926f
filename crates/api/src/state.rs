use std::sync::Arc;

use crate::config::ServerConfig;
use crate::rooms::RoomCatalog;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// It holds no session or party state; all of that lives in the database.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lobby_db::DbPool,
    /// Server configuration (TTLs used by handlers).
    pub config: Arc<ServerConfig>,
    /// Room metadata for the server browser, refreshed in the background.
    pub rooms: Arc<RoomCatalog>,
}
