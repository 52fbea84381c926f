//! Repository for the `game_sessions` table (presence store).
//!
//! Every read that feeds a count filters by the liveness cutoff, so rows the
//! sweep has not reached yet never inflate the server browser.

use std::collections::HashMap;

use lobby_core::types::Timestamp;

use crate::models::game_session::{GameSession, JoinSession, RoomPlayerCount};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "room_id, player_id, player_name, joined_at, last_heartbeat_at";

/// Provides presence operations keyed by `(room_id, player_id)`.
pub struct GameSessionRepo;

impl GameSessionRepo {
    /// Record or refresh a player's presence in a room.
    ///
    /// Single-statement upsert on the composite primary key, so concurrent
    /// joins for the same player cannot create duplicates. A re-join refreshes
    /// `last_heartbeat_at` and the display name; `joined_at` is kept unless the
    /// previous session had already gone stale (older than `cutoff`).
    pub async fn upsert(
        pool: &DbPool,
        input: &JoinSession,
        now: Timestamp,
        cutoff: Timestamp,
    ) -> Result<GameSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO game_sessions \
                (room_id, player_id, player_name, joined_at, last_heartbeat_at) \
             VALUES (?1, ?2, ?3, ?4, ?4) \
             ON CONFLICT (room_id, player_id) DO UPDATE SET \
                player_name = excluded.player_name, \
                joined_at = CASE WHEN game_sessions.last_heartbeat_at < ?5 \
                                 THEN excluded.joined_at ELSE game_sessions.joined_at END, \
                last_heartbeat_at = excluded.last_heartbeat_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GameSession>(&query)
            .bind(&input.room_id)
            .bind(&input.player_id)
            .bind(&input.player_name)
            .bind(now)
            .bind(cutoff)
            .fetch_one(pool)
            .await
    }

    /// Remove a player's session. Returns `true` if a row was deleted.
    pub async fn remove(
        pool: &DbPool,
        room_id: &str,
        player_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM game_sessions WHERE room_id = ?1 AND player_id = ?2")
            .bind(room_id)
            .bind(player_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Refresh the heartbeat of a live session.
    ///
    /// Returns `None` if there is no session, or it is already stale; the
    /// client has to join again in that case.
    pub async fn touch(
        pool: &DbPool,
        room_id: &str,
        player_id: &str,
        now: Timestamp,
        cutoff: Timestamp,
    ) -> Result<Option<GameSession>, sqlx::Error> {
        let query = format!(
            "UPDATE game_sessions SET last_heartbeat_at = ?3 \
             WHERE room_id = ?1 AND player_id = ?2 AND last_heartbeat_at >= ?4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GameSession>(&query)
            .bind(room_id)
            .bind(player_id)
            .bind(now)
            .bind(cutoff)
            .fetch_optional(pool)
            .await
    }

    /// List live sessions in one room, oldest join first.
    pub async fn list_live_in_room(
        pool: &DbPool,
        room_id: &str,
        cutoff: Timestamp,
    ) -> Result<Vec<GameSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM game_sessions \
             WHERE room_id = ?1 AND last_heartbeat_at >= ?2 \
             ORDER BY joined_at ASC, player_id ASC"
        );
        sqlx::query_as::<_, GameSession>(&query)
            .bind(room_id)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Live player counts for every room with at least one live session.
    ///
    /// One aggregate statement, so the result is a consistent snapshot.
    pub async fn count_live_by_room(
        pool: &DbPool,
        cutoff: Timestamp,
    ) -> Result<HashMap<String, i64>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RoomPlayerCount>(
            "SELECT room_id, COUNT(*) AS player_count FROM game_sessions \
             WHERE last_heartbeat_at >= ?1 \
             GROUP BY room_id",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.room_id, row.player_count))
            .collect())
    }

    /// Delete sessions whose last heartbeat is older than `cutoff`.
    /// Returns the number of purged rows.
    pub async fn delete_stale(pool: &DbPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM game_sessions WHERE last_heartbeat_at < ?1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
