//! Presence constants and liveness rules for game-room sessions.
//!
//! A session is live while its last heartbeat is within the TTL window. The
//! background sweep deletes sessions past the window, but read paths also
//! filter by the same cutoff so counts are exact even between sweeps.

use chrono::Duration;

use crate::types::Timestamp;
use crate::validation::{validate_display_name, validate_identifier};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Sessions without a heartbeat for this many seconds are considered gone.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 30;

/// How often the stale-session sweep runs (in seconds).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;

/// Maximum length of a player display name.
pub const MAX_PLAYER_NAME_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

/// Oldest heartbeat that still counts as live at `now`.
///
/// Queries treat `last_heartbeat_at >= cutoff` as live; the sweep only
/// removes rows strictly older than the cutoff.
pub fn stale_cutoff(now: Timestamp, ttl_secs: i64) -> Timestamp {
    now - Duration::seconds(ttl_secs)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the `(roomId, playerId)` key of a session.
pub fn validate_session_key(room_id: &str, player_id: &str) -> Result<(), String> {
    validate_identifier("roomId", room_id)?;
    validate_identifier("playerId", player_id)
}

/// Validate a join request: session key plus display name.
pub fn validate_join(room_id: &str, player_id: &str, player_name: &str) -> Result<(), String> {
    validate_session_key(room_id, player_id)?;
    validate_display_name("playerName", player_name, MAX_PLAYER_NAME_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_stale_cutoff() {
        assert_eq!(stale_cutoff(at(100), 30), at(70));
    }

    #[test]
    fn test_validate_join() {
        assert!(validate_join("arena1", "p1", "Alice").is_ok());
        assert!(validate_join("", "p1", "Alice").is_err());
        assert!(validate_join("arena1", "", "Alice").is_err());
        assert!(validate_join("arena1", "p1", &"a".repeat(MAX_PLAYER_NAME_LEN + 1)).is_err());
    }
}
