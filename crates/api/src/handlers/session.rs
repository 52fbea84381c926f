//! Handlers for game-room presence: join, leave, heartbeat and room roster.
//!
//! Join and leave are idempotent. Liveness is judged against
//! `SESSION_TTL_SECS`; the background sweep deletes what has gone stale.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use lobby_core::error::CoreError;
use lobby_core::presence::{stale_cutoff, validate_join, validate_session_key};
use lobby_core::validation::require_fields;
use lobby_db::models::game_session::{
    GameSession, JoinSession, JoinSessionRequest, RoomRosterParams, SessionKeyRequest,
};
use lobby_db::repositories::GameSessionRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Live players of one room.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRoster {
    pub room_id: String,
    pub players: Vec<GameSession>,
    pub count: usize,
}

/// POST /session/join
///
/// Record the player as present in the room. Re-joining refreshes the
/// heartbeat and display name without double counting.
pub async fn join(
    State(state): State<AppState>,
    Json(input): Json<JoinSessionRequest>,
) -> AppResult<impl IntoResponse> {
    require_fields(&[
        ("roomId", input.room_id.as_deref()),
        ("playerId", input.player_id.as_deref()),
        ("playerName", input.player_name.as_deref()),
    ])
    .map_err(AppError::BadRequest)?;

    let join = JoinSession {
        room_id: input.room_id.unwrap_or_default(),
        player_id: input.player_id.unwrap_or_default(),
        player_name: input.player_name.unwrap_or_default().trim().to_string(),
    };
    validate_join(&join.room_id, &join.player_id, &join.player_name)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let now = Utc::now();
    let session = GameSessionRepo::upsert(
        &state.pool,
        &join,
        now,
        stale_cutoff(now, state.config.session_ttl_secs),
    )
    .await?;

    tracing::info!(
        room_id = %session.room_id,
        player_id = %session.player_id,
        "Player joined room"
    );

    Ok(Json(SuccessResponse::ok()))
}

/// POST /session/leave
///
/// Remove the player from the room. Leaving a room you are not in succeeds.
pub async fn leave(
    State(state): State<AppState>,
    Json(input): Json<SessionKeyRequest>,
) -> AppResult<impl IntoResponse> {
    let (room_id, player_id) = session_key(input)?;

    let removed = GameSessionRepo::remove(&state.pool, &room_id, &player_id).await?;

    if removed {
        tracing::info!(room_id = %room_id, player_id = %player_id, "Player left room");
    } else {
        tracing::debug!(room_id = %room_id, player_id = %player_id, "Leave for absent session");
    }

    Ok(Json(SuccessResponse::ok()))
}

/// POST /session/heartbeat
///
/// Keep a live session alive. 404 when there is no live session, in which
/// case the client must join again.
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(input): Json<SessionKeyRequest>,
) -> AppResult<impl IntoResponse> {
    let (room_id, player_id) = session_key(input)?;

    let now = Utc::now();
    GameSessionRepo::touch(
        &state.pool,
        &room_id,
        &player_id,
        now,
        stale_cutoff(now, state.config.session_ttl_secs),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "GameSession",
            id: format!("{room_id}/{player_id}"),
        })
    })?;

    Ok(Json(SuccessResponse::ok()))
}

/// GET /session/room?roomId=
///
/// Live sessions in one room, oldest join first.
pub async fn room_roster(
    State(state): State<AppState>,
    Query(params): Query<RoomRosterParams>,
) -> AppResult<impl IntoResponse> {
    require_fields(&[("roomId", params.room_id.as_deref())]).map_err(AppError::BadRequest)?;
    let room_id = params.room_id.unwrap_or_default();

    let cutoff = stale_cutoff(Utc::now(), state.config.session_ttl_secs);
    let players = GameSessionRepo::list_live_in_room(&state.pool, &room_id, cutoff).await?;

    Ok(Json(RoomRoster {
        count: players.len(),
        room_id,
        players,
    }))
}

/// Extract and validate `(roomId, playerId)` from a request body.
fn session_key(input: SessionKeyRequest) -> AppResult<(String, String)> {
    require_fields(&[
        ("roomId", input.room_id.as_deref()),
        ("playerId", input.player_id.as_deref()),
    ])
    .map_err(AppError::BadRequest)?;

    let room_id = input.room_id.unwrap_or_default();
    let player_id = input.player_id.unwrap_or_default();
    validate_session_key(&room_id, &player_id)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    Ok((room_id, player_id))
}
