//! Party and party member models and DTOs.

use lobby_core::party::MAX_PARTY_MEMBERS;
use lobby_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `parties` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub status: String,
    pub created_at: Timestamp,
    pub disbanded_at: Option<Timestamp>,
}

/// A row from the `party_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyMember {
    pub party_id: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub joined_at: Timestamp,
}

/// A party together with its current members, as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyWithMembers {
    #[serde(flatten)]
    pub party: Party,
    pub members: Vec<PartyMember>,
    pub member_count: i64,
    pub max_members: i64,
}

impl PartyWithMembers {
    pub fn new(party: Party, members: Vec<PartyMember>) -> Self {
        Self {
            party,
            member_count: members.len() as i64,
            members,
            max_members: MAX_PARTY_MEMBERS,
        }
    }
}

/// Input for creating a party with its owner as first member.
#[derive(Debug, Clone)]
pub struct CreateParty {
    pub owner_id: String,
    pub owner_username: String,
    pub name: String,
}

/// Request body for `POST /party/create`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartyRequest {
    pub owner_id: Option<String>,
    pub owner_username: Option<String>,
    pub party_name: Option<String>,
}

/// Request body for `POST /party/leave` and `POST /party/disband`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyMemberRequest {
    pub party_id: Option<String>,
    pub user_id: Option<String>,
}

/// Query parameters carrying the caller's user id (`?userId=`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdParams {
    pub user_id: Option<String>,
}
