//! Handlers for parties and party invitations.
//!
//! Callers are pre-authenticated upstream; the acting user is named by the
//! `userId` / `ownerId` / `fromUserId` field of each request. Every write is
//! one repository transaction, and repository outcomes are mapped to HTTP
//! errors here.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use lobby_core::error::CoreError;
use lobby_core::party::{
    invitation_expires_at, normalize_party_name, validate_create_party, validate_invite,
};
use lobby_core::types::Timestamp;
use lobby_core::validation::{require_fields, validate_identifier};
use lobby_db::models::party::{
    CreateParty, CreatePartyRequest, PartyMemberRequest, PartyWithMembers, UserIdParams,
};
use lobby_db::models::party_invitation::{
    CreateInvitation, InvitationActionRequest, InviteRequest, PartyInvitation,
};
use lobby_db::repositories::{
    AcceptOutcome, CreatePartyOutcome, DeclineOutcome, DisbandOutcome, InviteOutcome,
    LeaveOutcome, PartyInvitationRepo, PartyRepo,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::{SuccessResponse, SuccessWith};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPartyResponse {
    pub has_party: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<PartyWithMembers>,
    pub timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct PartyResponse {
    pub party: PartyWithMembers,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedParty {
    pub party_id: String,
    pub party: PartyWithMembers,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedInvitation {
    pub invitation_id: String,
}

#[derive(Debug, Serialize)]
pub struct InvitationList {
    pub invitations: Vec<PartyInvitation>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedInvitation {
    pub party_id: String,
    pub member_count: i64,
}

// ---------------------------------------------------------------------------
// Party queries
// ---------------------------------------------------------------------------

/// GET /party/current?userId=
///
/// The one active party the user belongs to, if any. Clients poll this to
/// reconcile after a reload.
pub async fn current_party(
    State(state): State<AppState>,
    Query(params): Query<UserIdParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = required_user_id(params)?;

    let party = PartyRepo::find_current_for_user(&state.pool, &user_id).await?;

    Ok(Json(CurrentPartyResponse {
        has_party: party.is_some(),
        party,
        timestamp: Utc::now(),
    }))
}

/// GET /party/{party_id}
pub async fn get_party(
    State(state): State<AppState>,
    Path(party_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let party = PartyRepo::find_with_members(&state.pool, &party_id)
        .await?
        .ok_or_else(|| party_not_found(&party_id))?;

    Ok(Json(PartyResponse { party }))
}

// ---------------------------------------------------------------------------
// Party lifecycle
// ---------------------------------------------------------------------------

/// POST /party/create
///
/// Create a party with the caller as owner. 409 if the caller is already in
/// an active party.
pub async fn create_party(
    State(state): State<AppState>,
    Json(input): Json<CreatePartyRequest>,
) -> AppResult<impl IntoResponse> {
    require_fields(&[
        ("ownerId", input.owner_id.as_deref()),
        ("ownerUsername", input.owner_username.as_deref()),
        ("partyName", input.party_name.as_deref()),
    ])
    .map_err(AppError::BadRequest)?;

    let owner_id = input.owner_id.unwrap_or_default();
    let owner_username = input.owner_username.unwrap_or_default().trim().to_string();
    validate_create_party(&owner_id, &owner_username).map_err(validation)?;
    let name = normalize_party_name(&input.party_name.unwrap_or_default()).map_err(validation)?;

    let create = CreateParty {
        owner_id,
        owner_username,
        name,
    };

    match PartyRepo::create(&state.pool, &create, Utc::now()).await? {
        CreatePartyOutcome::Created(party) => {
            tracing::info!(
                party_id = %party.party.id,
                owner_id = %create.owner_id,
                "Party created"
            );
            Ok(Json(SuccessWith::new(CreatedParty {
                party_id: party.party.id.clone(),
                party,
            })))
        }
        CreatePartyOutcome::AlreadyInParty(existing) => {
            tracing::debug!(
                owner_id = %create.owner_id,
                party_id = %existing.id,
                "Party create rejected, user already in a party"
            );
            Err(conflict("You already have an active party"))
        }
    }
}

/// POST /party/leave
///
/// Leave a party. The oldest remaining member inherits ownership; the last
/// member out disbands the party. Leaving a party you are not in succeeds.
pub async fn leave_party(
    State(state): State<AppState>,
    Json(input): Json<PartyMemberRequest>,
) -> AppResult<impl IntoResponse> {
    let (party_id, user_id) = party_member_key(input)?;

    let outcome = PartyRepo::leave(&state.pool, &party_id, &user_id, Utc::now()).await?;

    match &outcome {
        LeaveOutcome::NotMember => {
            tracing::debug!(party_id = %party_id, user_id = %user_id, "Leave for non-member");
        }
        LeaveOutcome::Left => {
            tracing::info!(party_id = %party_id, user_id = %user_id, "Member left party");
        }
        LeaveOutcome::OwnershipTransferred { new_owner_id } => {
            tracing::info!(
                party_id = %party_id,
                user_id = %user_id,
                new_owner_id = %new_owner_id,
                "Owner left party, ownership transferred"
            );
        }
        LeaveOutcome::Disbanded => {
            tracing::info!(
                party_id = %party_id,
                user_id = %user_id,
                "Last member left, party disbanded"
            );
        }
    }

    Ok(Json(SuccessResponse::ok()))
}

/// POST /party/disband
///
/// Disband a party. Owner only; disbanding twice succeeds.
pub async fn disband_party(
    State(state): State<AppState>,
    Json(input): Json<PartyMemberRequest>,
) -> AppResult<impl IntoResponse> {
    let (party_id, user_id) = party_member_key(input)?;

    match PartyRepo::disband(&state.pool, &party_id, &user_id, Utc::now()).await? {
        DisbandOutcome::Disbanded => {
            tracing::info!(party_id = %party_id, user_id = %user_id, "Party disbanded");
            Ok(Json(SuccessResponse::ok()))
        }
        DisbandOutcome::AlreadyDisbanded => Ok(Json(SuccessResponse::ok())),
        DisbandOutcome::NotFound => Err(party_not_found(&party_id)),
        DisbandOutcome::NotOwner => Err(forbidden("Only the party owner can disband the party")),
    }
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

/// POST /party/invite
///
/// Invite a user into a party. The inviter must be a member. 409 if the
/// recipient is already a member or already holds a pending invitation.
pub async fn invite(
    State(state): State<AppState>,
    Json(input): Json<InviteRequest>,
) -> AppResult<impl IntoResponse> {
    require_fields(&[
        ("partyId", input.party_id.as_deref()),
        ("fromUserId", input.from_user_id.as_deref()),
        ("toUserId", input.to_user_id.as_deref()),
        ("toUsername", input.to_username.as_deref()),
    ])
    .map_err(AppError::BadRequest)?;

    let create = CreateInvitation {
        party_id: input.party_id.unwrap_or_default(),
        from_user_id: input.from_user_id.unwrap_or_default(),
        to_user_id: input.to_user_id.unwrap_or_default(),
        to_username: input.to_username.unwrap_or_default().trim().to_string(),
    };
    validate_invite(
        &create.party_id,
        &create.from_user_id,
        &create.to_user_id,
        &create.to_username,
    )
    .map_err(validation)?;

    let now = Utc::now();
    let expires_at = invitation_expires_at(now, state.config.invitation_ttl_secs);

    match PartyInvitationRepo::create(&state.pool, &create, now, expires_at).await? {
        InviteOutcome::Created(invitation) => {
            tracing::info!(
                invitation_id = %invitation.id,
                party_id = %invitation.party_id,
                from_user_id = %invitation.from_user_id,
                to_user_id = %invitation.to_user_id,
                "Party invitation sent"
            );
            Ok(Json(SuccessWith::new(CreatedInvitation {
                invitation_id: invitation.id,
            })))
        }
        InviteOutcome::PartyNotFound => Err(party_not_found(&create.party_id)),
        InviteOutcome::InviterNotMember => {
            Err(forbidden("Only party members can send invitations"))
        }
        InviteOutcome::AlreadyMember => Err(conflict("User is already a member of this party")),
        InviteOutcome::AlreadyInvited => {
            Err(conflict("User already has a pending invitation to this party"))
        }
    }
}

/// GET /party/invitations?userId=
///
/// The user's pending, unexpired invitations, newest first.
pub async fn list_invitations(
    State(state): State<AppState>,
    Query(params): Query<UserIdParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = required_user_id(params)?;

    let invitations =
        PartyInvitationRepo::list_pending_for_user(&state.pool, &user_id, Utc::now()).await?;

    Ok(Json(InvitationList {
        count: invitations.len(),
        invitations,
    }))
}

/// POST /party/accept-invitation
///
/// Accept an invitation and join its party atomically. 404 if unknown,
/// 410 if expired or already answered, 409 if the party is full or the
/// caller is in another party (the invitation then stays pending).
pub async fn accept_invitation(
    State(state): State<AppState>,
    Json(input): Json<InvitationActionRequest>,
) -> AppResult<impl IntoResponse> {
    let (invitation_id, user_id) = invitation_key(input)?;

    match PartyInvitationRepo::accept(&state.pool, &invitation_id, &user_id, Utc::now()).await? {
        AcceptOutcome::Accepted {
            party_id,
            member_count,
        } => {
            tracing::info!(
                invitation_id = %invitation_id,
                party_id = %party_id,
                user_id = %user_id,
                member_count,
                "Party invitation accepted"
            );
            Ok(Json(SuccessWith::new(AcceptedInvitation {
                party_id,
                member_count,
            })))
        }
        AcceptOutcome::NotFound => Err(invitation_not_found(&invitation_id)),
        AcceptOutcome::AlreadyResolved { status } => Err(invitation_resolved(&status)),
        AcceptOutcome::Expired => Err(invitation_expired()),
        AcceptOutcome::PartyGone => Err(gone("Party has been disbanded")),
        AcceptOutcome::PartyFull => Err(conflict("Party is full")),
        AcceptOutcome::AlreadyInParty { .. } => {
            Err(conflict("You already have an active party; leave it before accepting"))
        }
    }
}

/// POST /party/decline-invitation
pub async fn decline_invitation(
    State(state): State<AppState>,
    Json(input): Json<InvitationActionRequest>,
) -> AppResult<impl IntoResponse> {
    let (invitation_id, user_id) = invitation_key(input)?;

    match PartyInvitationRepo::decline(&state.pool, &invitation_id, &user_id, Utc::now()).await? {
        DeclineOutcome::Declined => {
            tracing::info!(
                invitation_id = %invitation_id,
                user_id = %user_id,
                "Party invitation declined"
            );
            Ok(Json(SuccessResponse::ok()))
        }
        DeclineOutcome::NotFound => Err(invitation_not_found(&invitation_id)),
        DeclineOutcome::AlreadyResolved { status } => Err(invitation_resolved(&status)),
        DeclineOutcome::Expired => Err(invitation_expired()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validation(msg: String) -> AppError {
    AppError::Core(CoreError::Validation(msg))
}

fn party_not_found(party_id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Party",
        id: party_id.to_string(),
    })
}

fn invitation_not_found(invitation_id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "PartyInvitation",
        id: invitation_id.to_string(),
    })
}

fn invitation_expired() -> AppError {
    gone("Invitation has expired")
}

fn invitation_resolved(status: &str) -> AppError {
    gone(&format!("Invitation was already {status}"))
}

fn conflict(msg: &str) -> AppError {
    AppError::Core(CoreError::Conflict(msg.to_string()))
}

fn forbidden(msg: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(msg.to_string()))
}

fn gone(msg: &str) -> AppError {
    AppError::Core(CoreError::Gone(msg.to_string()))
}

fn required_user_id(params: UserIdParams) -> AppResult<String> {
    require_fields(&[("userId", params.user_id.as_deref())]).map_err(AppError::BadRequest)?;
    let user_id = params.user_id.unwrap_or_default();
    validate_identifier("userId", &user_id).map_err(validation)?;
    Ok(user_id)
}

fn party_member_key(input: PartyMemberRequest) -> AppResult<(String, String)> {
    require_fields(&[
        ("partyId", input.party_id.as_deref()),
        ("userId", input.user_id.as_deref()),
    ])
    .map_err(AppError::BadRequest)?;

    let party_id = input.party_id.unwrap_or_default();
    let user_id = input.user_id.unwrap_or_default();
    validate_identifier("partyId", &party_id).map_err(validation)?;
    validate_identifier("userId", &user_id).map_err(validation)?;
    Ok((party_id, user_id))
}

fn invitation_key(input: InvitationActionRequest) -> AppResult<(String, String)> {
    require_fields(&[
        ("invitationId", input.invitation_id.as_deref()),
        ("userId", input.user_id.as_deref()),
    ])
    .map_err(AppError::BadRequest)?;

    let invitation_id = input.invitation_id.unwrap_or_default();
    let user_id = input.user_id.unwrap_or_default();
    validate_identifier("invitationId", &invitation_id).map_err(validation)?;
    validate_identifier("userId", &user_id).map_err(validation)?;
    Ok((invitation_id, user_id))
}
