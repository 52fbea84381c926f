//! Server browser: room metadata and the derived listing rules.
//!
//! Room metadata is owned by the room-hosting subsystem and only read here.
//! Listings are computed per request from that metadata and a snapshot of
//! live player counts; nothing in this module is cached or stored.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// House rake taken from staked pots.
pub const RAKE: f64 = 0.10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Static description of a game room, supplied by the hosting subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMeta {
    pub room_id: String,
    pub display_name: String,
    pub region: String,
    pub mode: String,
    pub min_players: i64,
    pub max_players: i64,
    #[serde(default)]
    pub stake_amount: f64,
}

/// Occupancy state of a room as shown in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Waiting,
    Active,
    Full,
}

/// One row of the server browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerListing {
    #[serde(flatten)]
    pub room: RoomMeta,
    pub current_players: i64,
    pub status: ServerStatus,
    pub potential_winnings: f64,
}

/// The full browser payload returned by `GET /servers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerBrowser {
    pub servers: Vec<ServerListing>,
    pub total_players: i64,
    pub total_active_servers: i64,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive a room's status from its live player count.
pub fn derive_status(current_players: i64, min_players: i64, max_players: i64) -> ServerStatus {
    if current_players >= max_players {
        ServerStatus::Full
    } else if current_players >= min_players {
        ServerStatus::Active
    } else {
        ServerStatus::Waiting
    }
}

/// Pot paid out to the winner of a full staked room, after rake.
///
/// Free rooms (stake of zero or less) report 0. Rounded to cents.
pub fn potential_winnings(stake_amount: f64, max_players: i64) -> f64 {
    if stake_amount <= 0.0 {
        return 0.0;
    }
    let pot = stake_amount * max_players as f64 * (1.0 - RAKE);
    (pot * 100.0).round() / 100.0
}

/// Merge room metadata with live counts into the browser payload.
///
/// Every configured room appears exactly once, in catalog order, including
/// rooms with no live sessions. Counts for rooms not in the catalog are
/// ignored. A server is "active" for the totals when it has at least one
/// player.
pub fn build_server_browser(rooms: &[RoomMeta], counts: &HashMap<String, i64>) -> ServerBrowser {
    let servers: Vec<ServerListing> = rooms
        .iter()
        .map(|room| {
            let current_players = counts.get(&room.room_id).copied().unwrap_or(0);
            ServerListing {
                current_players,
                status: derive_status(current_players, room.min_players, room.max_players),
                potential_winnings: potential_winnings(room.stake_amount, room.max_players),
                room: room.clone(),
            }
        })
        .collect();

    let total_players = servers.iter().map(|s| s.current_players).sum();
    let total_active_servers = servers.iter().filter(|s| s.current_players > 0).count() as i64;

    ServerBrowser {
        servers,
        total_players,
        total_active_servers,
    }
}

// ---------------------------------------------------------------------------
// Catalog validation
// ---------------------------------------------------------------------------

/// Validate a room catalog. Returns `Ok(())` or a message naming the first problem.
pub fn validate_catalog(rooms: &[RoomMeta]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for room in rooms {
        if room.room_id.trim().is_empty() {
            return Err("roomId must not be empty".to_string());
        }
        if !seen.insert(room.room_id.as_str()) {
            return Err(format!("Duplicate roomId '{}'", room.room_id));
        }
        if room.min_players < 1 {
            return Err(format!(
                "Room '{}': minPlayers must be at least 1, got {}",
                room.room_id, room.min_players
            ));
        }
        if room.min_players > room.max_players {
            return Err(format!(
                "Room '{}': minPlayers ({}) exceeds maxPlayers ({})",
                room.room_id, room.min_players, room.max_players
            ));
        }
        if room.stake_amount < 0.0 || !room.stake_amount.is_finite() {
            return Err(format!(
                "Room '{}': stakeAmount must be a non-negative number",
                room.room_id
            ));
        }
    }
    Ok(())
}

/// Built-in catalog used when no rooms file is configured.
pub fn default_catalog() -> Vec<RoomMeta> {
    fn room(
        id: &str,
        name: &str,
        region: &str,
        mode: &str,
        min: i64,
        max: i64,
        stake: f64,
    ) -> RoomMeta {
        RoomMeta {
            room_id: id.to_string(),
            display_name: name.to_string(),
            region: region.to_string(),
            mode: mode.to_string(),
            min_players: min,
            max_players: max,
            stake_amount: stake,
        }
    }

    vec![
        room("arena1", "Arena One", "us-east", "free", 2, 8, 0.0),
        room("arena2", "Arena Two", "eu-west", "free", 2, 8, 0.0),
        room("highroller", "High Roller", "us-east", "staked", 2, 4, 10.0),
        room("duel", "Duel Pit", "eu-west", "staked", 2, 2, 1.0),
    ]
}
