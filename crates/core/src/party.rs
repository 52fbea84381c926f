//! Party and invitation constants, status vocabularies, and validation.
//!
//! Statuses and roles are stored as plain strings in the database; the
//! constant modules below are the only place those strings are spelled out.

use chrono::Duration;

use crate::types::Timestamp;
use crate::validation::{validate_display_name, validate_identifier};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum number of members in one party, owner included.
pub const MAX_PARTY_MEMBERS: i64 = 8;

/// Maximum party name length in characters (after trimming).
pub const MAX_PARTY_NAME_LEN: usize = 32;

/// Maximum username length in characters.
pub const MAX_USERNAME_LEN: usize = 64;

/// Invitations expire this many seconds after creation (5 minutes).
pub const DEFAULT_INVITATION_TTL_SECS: i64 = 300;

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

/// Party lifecycle states.
pub mod party_status {
    pub const ACTIVE: &str = "active";
    pub const DISBANDED: &str = "disbanded";
}

/// Member roles within a party.
pub mod member_roles {
    pub const OWNER: &str = "owner";
    pub const MEMBER: &str = "member";
}

/// Invitation lifecycle states. `pending` is the only non-terminal state.
pub mod invitation_status {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const DECLINED: &str = "declined";
    pub const EXPIRED: &str = "expired";
}

/// Returns `true` if an invitation in `status` can no longer change.
pub fn is_terminal_invitation_status(status: &str) -> bool {
    matches!(
        status,
        invitation_status::ACCEPTED | invitation_status::DECLINED | invitation_status::EXPIRED
    )
}

// ---------------------------------------------------------------------------
// Invitation expiry
// ---------------------------------------------------------------------------

/// Expiry instant for an invitation created at `created_at`.
pub fn invitation_expires_at(created_at: Timestamp, ttl_secs: i64) -> Timestamp {
    created_at + Duration::seconds(ttl_secs)
}

/// An invitation is expired once `now` reaches its expiry instant.
pub fn is_invitation_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now >= expires_at
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate and normalize a party name. Returns the trimmed name.
pub fn normalize_party_name(name: &str) -> Result<String, String> {
    validate_display_name("partyName", name, MAX_PARTY_NAME_LEN)?;
    Ok(name.trim().to_string())
}

/// Validate the inputs of a party creation.
pub fn validate_create_party(owner_id: &str, owner_username: &str) -> Result<(), String> {
    validate_identifier("ownerId", owner_id)?;
    validate_display_name("ownerUsername", owner_username, MAX_USERNAME_LEN)
}

/// Validate the inputs of an invitation.
pub fn validate_invite(
    party_id: &str,
    from_user_id: &str,
    to_user_id: &str,
    to_username: &str,
) -> Result<(), String> {
    validate_identifier("partyId", party_id)?;
    validate_identifier("fromUserId", from_user_id)?;
    validate_identifier("toUserId", to_user_id)?;
    validate_display_name("toUsername", to_username, MAX_USERNAME_LEN)?;
    if from_user_id == to_user_id {
        return Err("Cannot invite yourself to a party".to_string());
    }
    Ok(())
}
