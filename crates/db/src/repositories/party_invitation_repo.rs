//! Repository for the `party_invitations` table.
//!
//! An invitation changes state exactly once: `pending` to `accepted`,
//! `declined` or `expired`. Every transition is a guarded
//! `UPDATE ... WHERE status = 'pending'`, so two concurrent accepts of the
//! same invitation cannot both succeed. Expiry is enforced lazily whenever
//! invitations are read or acted on.

use lobby_core::party::{
    invitation_status, is_invitation_expired, is_terminal_invitation_status, member_roles,
    party_status, MAX_PARTY_MEMBERS,
};
use lobby_core::types::Timestamp;
use sqlx::{Sqlite, Transaction};

use crate::models::party::Party;
use crate::models::party_invitation::{CreateInvitation, PartyInvitation};
use crate::repositories::PartyRepo;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, party_id, party_name, from_user_id, from_username, \
                       to_user_id, to_username, created_at, expires_at, status, responded_at";

/// Result of [`PartyInvitationRepo::create`].
#[derive(Debug)]
pub enum InviteOutcome {
    Created(PartyInvitation),
    /// The party does not exist or has been disbanded.
    PartyNotFound,
    /// The inviter is not a member of the party.
    InviterNotMember,
    /// The recipient is already a member of the party.
    AlreadyMember,
    /// The recipient already holds a pending invitation to the party.
    AlreadyInvited,
}

/// Result of [`PartyInvitationRepo::accept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted {
        party_id: String,
        member_count: i64,
    },
    /// No invitation with that id addressed to this user.
    NotFound,
    /// The invitation was already accepted, declined or expired.
    AlreadyResolved {
        status: String,
    },
    /// The invitation passed its expiry time; it is now marked expired.
    Expired,
    /// The party was disbanded after the invitation was sent.
    PartyGone,
    PartyFull,
    /// The recipient already belongs to an active party.
    AlreadyInParty {
        party_id: String,
    },
}

/// Result of [`PartyInvitationRepo::decline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineOutcome {
    Declined,
    NotFound,
    AlreadyResolved { status: String },
    Expired,
}

/// Why a guarded pending-to-X transition did not apply.
enum Unresolvable {
    NotFound,
    AlreadyResolved(String),
    Expired,
}

/// Provides invitation lifecycle operations.
pub struct PartyInvitationRepo;

impl PartyInvitationRepo {
    /// Create a pending invitation from a party member to another user.
    ///
    /// Stale pending invitations for the same (party, recipient) are expired
    /// first so they do not block a fresh invite.
    pub async fn create(
        pool: &DbPool,
        input: &CreateInvitation,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<InviteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE party_invitations SET status = ?3, responded_at = ?4 \
             WHERE party_id = ?1 AND to_user_id = ?2 AND status = ?5 AND expires_at <= ?4",
        )
        .bind(&input.party_id)
        .bind(&input.to_user_id)
        .bind(invitation_status::EXPIRED)
        .bind(now)
        .bind(invitation_status::PENDING)
        .execute(&mut *tx)
        .await?;

        let party = sqlx::query_as::<_, Party>(
            "SELECT id, name, owner_id, status, created_at, disbanded_at \
             FROM parties WHERE id = ?1 AND status = ?2",
        )
        .bind(&input.party_id)
        .bind(party_status::ACTIVE)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(party) = party else {
            tx.rollback().await?;
            return Ok(InviteOutcome::PartyNotFound);
        };

        let members = PartyRepo::members_in(&mut tx, &party.id).await?;

        let Some(inviter) = members.iter().find(|m| m.user_id == input.from_user_id) else {
            tx.rollback().await?;
            return Ok(InviteOutcome::InviterNotMember);
        };

        if members.iter().any(|m| m.user_id == input.to_user_id) {
            tx.rollback().await?;
            return Ok(InviteOutcome::AlreadyMember);
        }

        let query = format!(
            "INSERT INTO party_invitations \
                (id, party_id, party_name, from_user_id, from_username, to_user_id, to_username, \
                 created_at, expires_at, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, PartyInvitation>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&party.id)
            .bind(&party.name)
            .bind(&inviter.user_id)
            .bind(&inviter.username)
            .bind(&input.to_user_id)
            .bind(&input.to_username)
            .bind(now)
            .bind(expires_at)
            .bind(invitation_status::PENDING)
            .fetch_one(&mut *tx)
            .await;

        match inserted {
            Ok(invitation) => {
                tx.commit().await?;
                Ok(InviteOutcome::Created(invitation))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tx.rollback().await?;
                Ok(InviteOutcome::AlreadyInvited)
            }
            Err(e) => Err(e),
        }
    }

    /// Find an invitation by id, whatever its status.
    pub async fn find_by_id(
        pool: &DbPool,
        invitation_id: &str,
    ) -> Result<Option<PartyInvitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM party_invitations WHERE id = ?1");
        sqlx::query_as::<_, PartyInvitation>(&query)
            .bind(invitation_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's pending, unexpired invitations, newest first.
    ///
    /// Pending invitations past their expiry are flipped to `expired` first.
    /// That write only happens when a cheap existence check finds one, so a
    /// poll with nothing to expire never waits on the SQLite write lock.
    pub async fn list_pending_for_user(
        pool: &DbPool,
        user_id: &str,
        now: Timestamp,
    ) -> Result<Vec<PartyInvitation>, sqlx::Error> {
        let has_stale: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM party_invitations \
             WHERE to_user_id = ?1 AND status = ?2 AND expires_at <= ?3)",
        )
        .bind(user_id)
        .bind(invitation_status::PENDING)
        .bind(now)
        .fetch_one(pool)
        .await?;

        if has_stale {
            let expired = sqlx::query(
                "UPDATE party_invitations SET status = ?2, responded_at = ?3 \
                 WHERE to_user_id = ?1 AND status = ?4 AND expires_at <= ?3",
            )
            .bind(user_id)
            .bind(invitation_status::EXPIRED)
            .bind(now)
            .bind(invitation_status::PENDING)
            .execute(pool)
            .await?;

            tracing::debug!(
                user_id,
                expired = expired.rows_affected(),
                "Expired stale party invitations"
            );
        }

        let query = format!(
            "SELECT {COLUMNS} FROM party_invitations \
             WHERE to_user_id = ?1 AND status = ?2 AND expires_at > ?3 \
             ORDER BY created_at DESC, rowid DESC"
        );
        sqlx::query_as::<_, PartyInvitation>(&query)
            .bind(user_id)
            .bind(invitation_status::PENDING)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Accept an invitation and join its party in one transaction.
    ///
    /// The invitation is marked accepted and the membership row inserted
    /// together; if any check fails the whole transaction is rolled back and
    /// the invitation stays pending. The one exception is an expired
    /// invitation, whose flip to `expired` is committed.
    pub async fn accept(
        pool: &DbPool,
        invitation_id: &str,
        user_id: &str,
        now: Timestamp,
    ) -> Result<AcceptOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE party_invitations SET status = ?3, responded_at = ?4 \
             WHERE id = ?1 AND to_user_id = ?2 AND status = ?5 AND expires_at > ?4 \
             RETURNING {COLUMNS}"
        );
        let accepted = sqlx::query_as::<_, PartyInvitation>(&query)
            .bind(invitation_id)
            .bind(user_id)
            .bind(invitation_status::ACCEPTED)
            .bind(now)
            .bind(invitation_status::PENDING)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(invitation) = accepted else {
            let outcome = match Self::diagnose(tx, invitation_id, user_id, now).await? {
                Unresolvable::NotFound => AcceptOutcome::NotFound,
                Unresolvable::AlreadyResolved(status) => AcceptOutcome::AlreadyResolved { status },
                Unresolvable::Expired => AcceptOutcome::Expired,
            };
            return Ok(outcome);
        };

        let party = sqlx::query_as::<_, Party>(
            "SELECT id, name, owner_id, status, created_at, disbanded_at \
             FROM parties WHERE id = ?1 AND status = ?2",
        )
        .bind(&invitation.party_id)
        .bind(party_status::ACTIVE)
        .fetch_optional(&mut *tx)
        .await?;

        if party.is_none() {
            tx.rollback().await?;
            return Ok(AcceptOutcome::PartyGone);
        }

        if let Some(current) = PartyRepo::current_party_in(&mut tx, user_id).await? {
            tx.rollback().await?;
            return Ok(AcceptOutcome::AlreadyInParty {
                party_id: current.id,
            });
        }

        let (member_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM party_members WHERE party_id = ?1")
                .bind(&invitation.party_id)
                .fetch_one(&mut *tx)
                .await?;

        if member_count >= MAX_PARTY_MEMBERS {
            tx.rollback().await?;
            return Ok(AcceptOutcome::PartyFull);
        }

        let inserted = PartyRepo::insert_member(
            &mut tx,
            &invitation.party_id,
            user_id,
            &invitation.to_username,
            member_roles::MEMBER,
            now,
        )
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(AcceptOutcome::Accepted {
                    party_id: invitation.party_id,
                    member_count: member_count + 1,
                })
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tx.rollback().await?;
                Ok(AcceptOutcome::AlreadyInParty {
                    party_id: invitation.party_id,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Decline a pending invitation. No other side effects.
    pub async fn decline(
        pool: &DbPool,
        invitation_id: &str,
        user_id: &str,
        now: Timestamp,
    ) -> Result<DeclineOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE party_invitations SET status = ?3, responded_at = ?4 \
             WHERE id = ?1 AND to_user_id = ?2 AND status = ?5 AND expires_at > ?4",
        )
        .bind(invitation_id)
        .bind(user_id)
        .bind(invitation_status::DECLINED)
        .bind(now)
        .bind(invitation_status::PENDING)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            tx.commit().await?;
            return Ok(DeclineOutcome::Declined);
        }

        Ok(match Self::diagnose(tx, invitation_id, user_id, now).await? {
            Unresolvable::NotFound => DeclineOutcome::NotFound,
            Unresolvable::AlreadyResolved(status) => DeclineOutcome::AlreadyResolved { status },
            Unresolvable::Expired => DeclineOutcome::Expired,
        })
    }

    /// Explain why a guarded transition matched no row, and finish `tx`.
    ///
    /// An invitation addressed to someone else is reported as not found. A
    /// pending invitation past its expiry (by the same rule
    /// [`is_invitation_expired`] applies) is flipped to `expired` and that
    /// change is committed; every other path rolls back.
    async fn diagnose(
        mut tx: Transaction<'_, Sqlite>,
        invitation_id: &str,
        user_id: &str,
        now: Timestamp,
    ) -> Result<Unresolvable, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM party_invitations WHERE id = ?1");
        let invitation = sqlx::query_as::<_, PartyInvitation>(&query)
            .bind(invitation_id)
            .fetch_optional(&mut *tx)
            .await?;

        match invitation {
            Some(inv) if inv.to_user_id != user_id => {
                tx.rollback().await?;
                Ok(Unresolvable::NotFound)
            }
            Some(inv) if is_terminal_invitation_status(&inv.status) => {
                tx.rollback().await?;
                Ok(Unresolvable::AlreadyResolved(inv.status))
            }
            Some(inv) if is_invitation_expired(inv.expires_at, now) => {
                sqlx::query(
                    "UPDATE party_invitations SET status = ?2, responded_at = ?3 \
                     WHERE id = ?1 AND status = ?4",
                )
                .bind(invitation_id)
                .bind(invitation_status::EXPIRED)
                .bind(now)
                .bind(invitation_status::PENDING)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
                Ok(Unresolvable::Expired)
            }
            _ => {
                tx.rollback().await?;
                Ok(Unresolvable::NotFound)
            }
        }
    }
}
