use axum::routing::get;
use axum::Router;

use crate::handlers::servers;
use crate::state::AppState;

/// Server browser route mounted at `/servers`.
///
/// ```text
/// GET    /                  -> list_servers
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(servers::list_servers))
}
