//! Route definitions for game-room presence.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Presence routes mounted at `/session`.
///
/// ```text
/// POST   /join              -> join
/// POST   /leave             -> leave
/// POST   /heartbeat         -> heartbeat
/// GET    /room?roomId=      -> room_roster
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/join", post(session::join))
        .route("/leave", post(session::leave))
        .route("/heartbeat", post(session::heartbeat))
        .route("/room", get(session::room_roster))
}
