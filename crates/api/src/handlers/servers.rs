//! Handler for the server browser.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use lobby_core::presence::stale_cutoff;
use lobby_core::server_browser::build_server_browser;
use lobby_db::repositories::GameSessionRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /servers
///
/// Every configured room with its live player count, status and potential
/// winnings. Computed fresh from one aggregate query per request.
pub async fn list_servers(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cutoff = stale_cutoff(Utc::now(), state.config.session_ttl_secs);
    let counts = GameSessionRepo::count_live_by_room(&state.pool, cutoff).await?;
    let rooms = state.rooms.snapshot().await;

    Ok(Json(build_server_browser(&rooms, &counts)))
}
