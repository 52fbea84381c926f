//! Game session (presence) model and DTOs.

use lobby_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `game_sessions` table: one player present in one room.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub room_id: String,
    pub player_id: String,
    pub player_name: String,
    pub joined_at: Timestamp,
    pub last_heartbeat_at: Timestamp,
}

/// Live player count for one room.
#[derive(Debug, Clone, FromRow)]
pub struct RoomPlayerCount {
    pub room_id: String,
    pub player_count: i64,
}

/// Input for joining (or re-joining) a room.
#[derive(Debug, Clone)]
pub struct JoinSession {
    pub room_id: String,
    pub player_id: String,
    pub player_name: String,
}

/// Request body for `POST /session/join`.
///
/// Fields are optional so missing ones produce a 400 listing every absent field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    pub room_id: Option<String>,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
}

/// Request body for `POST /session/leave` and `POST /session/heartbeat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionKeyRequest {
    pub room_id: Option<String>,
    pub player_id: Option<String>,
}

/// Query parameters for `GET /session/room`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRosterParams {
    pub room_id: Option<String>,
}
