//! Party invitation model and DTOs.

use lobby_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `party_invitations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInvitation {
    pub id: String,
    pub party_id: String,
    pub party_name: String,
    pub from_user_id: String,
    pub from_username: String,
    pub to_user_id: String,
    pub to_username: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: String,
    pub responded_at: Option<Timestamp>,
}

/// Input for creating an invitation. Party name and inviter username are
/// resolved from the party tables inside the insert transaction.
#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub party_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub to_username: String,
}

/// Request body for `POST /party/invite`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub party_id: Option<String>,
    pub from_user_id: Option<String>,
    pub to_user_id: Option<String>,
    pub to_username: Option<String>,
}

/// Request body for `POST /party/accept-invitation` and `POST /party/decline-invitation`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationActionRequest {
    pub invitation_id: Option<String>,
    pub user_id: Option<String>,
}
