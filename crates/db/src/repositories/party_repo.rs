//! Repository for the `parties` and `party_members` tables.
//!
//! `party_members` is the single source of truth for "which party is this
//! user in": it only holds memberships of active parties and has a unique
//! index on `user_id`. Creation, the current-party lookup, invitations and
//! departures all go through that table.
//!
//! SQLite allows one writer at a time. Every write transaction here starts
//! with a write statement so it takes the write lock up front; checks that
//! follow cannot race with another writer.

use lobby_core::party::{invitation_status, member_roles, party_status};
use lobby_core::types::Timestamp;
use sqlx::{Sqlite, Transaction};

use crate::models::party::{CreateParty, Party, PartyMember, PartyWithMembers};
use crate::DbPool;

/// Column list for `parties` queries.
const PARTY_COLUMNS: &str = "id, name, owner_id, status, created_at, disbanded_at";

/// Column list for `parties` queries joined under alias `p`.
const PARTY_COLUMNS_P: &str = "p.id, p.name, p.owner_id, p.status, p.created_at, p.disbanded_at";

/// Column list for `party_members` queries.
const MEMBER_COLUMNS: &str = "party_id, user_id, username, role, joined_at";

/// Result of [`PartyRepo::create`].
#[derive(Debug)]
pub enum CreatePartyOutcome {
    Created(PartyWithMembers),
    /// The owner already belongs to this active party.
    AlreadyInParty(Party),
}

/// Result of [`PartyRepo::leave`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The user was not a member of that party; nothing changed.
    NotMember,
    Left,
    /// The owner left and the oldest remaining member took over.
    OwnershipTransferred {
        new_owner_id: String,
    },
    /// The last member left and the party was disbanded.
    Disbanded,
}

/// Result of [`PartyRepo::disband`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisbandOutcome {
    Disbanded,
    AlreadyDisbanded,
    NotFound,
    NotOwner,
}

/// Provides party lifecycle and membership operations.
pub struct PartyRepo;

impl PartyRepo {
    /// Create a party and insert its owner as the first member, atomically.
    ///
    /// If the owner already belongs to an active party the transaction is
    /// rolled back and that party is returned instead.
    pub async fn create(
        pool: &DbPool,
        input: &CreateParty,
        now: Timestamp,
    ) -> Result<CreatePartyOutcome, sqlx::Error> {
        let party_id = uuid::Uuid::new_v4().to_string();
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO parties (id, name, owner_id, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING {PARTY_COLUMNS}"
        );
        let party = sqlx::query_as::<_, Party>(&query)
            .bind(&party_id)
            .bind(&input.name)
            .bind(&input.owner_id)
            .bind(party_status::ACTIVE)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(existing) = Self::current_party_in(&mut tx, &input.owner_id).await? {
            tx.rollback().await?;
            return Ok(CreatePartyOutcome::AlreadyInParty(existing));
        }

        let inserted = Self::insert_member(
            &mut tx,
            &party.id,
            &input.owner_id,
            &input.owner_username,
            member_roles::OWNER,
            now,
        )
        .await;

        match inserted {
            Ok(owner) => {
                tx.commit().await?;
                let created = PartyWithMembers::new(party, vec![owner]);
                Ok(CreatePartyOutcome::Created(created))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tx.rollback().await?;
                let existing = Self::find_current_for_user(pool, &input.owner_id).await?;
                match existing {
                    Some(current) => Ok(CreatePartyOutcome::AlreadyInParty(current.party)),
                    None => Err(sqlx::Error::Database(db_err)),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Find a party by id together with its members, read in one transaction.
    pub async fn find_with_members(
        pool: &DbPool,
        party_id: &str,
    ) -> Result<Option<PartyWithMembers>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {PARTY_COLUMNS} FROM parties WHERE id = ?1");
        let party = sqlx::query_as::<_, Party>(&query)
            .bind(party_id)
            .fetch_optional(&mut *tx)
            .await?;

        let result = match party {
            Some(party) => {
                let members = Self::members_in(&mut tx, &party.id).await?;
                Some(PartyWithMembers::new(party, members))
            }
            None => None,
        };

        tx.commit().await?;
        Ok(result)
    }

    /// The active party a user belongs to, with its members.
    ///
    /// This reads the same `party_members` rows that [`PartyRepo::create`]
    /// checks, so the two can never disagree.
    pub async fn find_current_for_user(
        pool: &DbPool,
        user_id: &str,
    ) -> Result<Option<PartyWithMembers>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = match Self::current_party_in(&mut tx, user_id).await? {
            Some(party) => {
                let members = Self::members_in(&mut tx, &party.id).await?;
                Some(PartyWithMembers::new(party, members))
            }
            None => None,
        };

        tx.commit().await?;
        Ok(result)
    }

    /// Remove a user from a party.
    ///
    /// When the owner leaves, the oldest remaining member (earliest
    /// `joined_at`, then insertion order) becomes owner. When nobody is left
    /// the party is disbanded and its pending invitations expire.
    pub async fn leave(
        pool: &DbPool,
        party_id: &str,
        user_id: &str,
        now: Timestamp,
    ) -> Result<LeaveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let role: Option<(String,)> = sqlx::query_as(
            "DELETE FROM party_members WHERE party_id = ?1 AND user_id = ?2 RETURNING role",
        )
        .bind(party_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((role,)) = role else {
            tx.rollback().await?;
            return Ok(LeaveOutcome::NotMember);
        };

        let successor: Option<(String,)> = sqlx::query_as(
            "SELECT user_id FROM party_members \
             WHERE party_id = ?1 \
             ORDER BY joined_at ASC, rowid ASC \
             LIMIT 1",
        )
        .bind(party_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match successor {
            None => {
                Self::mark_disbanded(&mut tx, party_id, now).await?;
                LeaveOutcome::Disbanded
            }
            Some((new_owner_id,)) if role == member_roles::OWNER => {
                sqlx::query(
                    "UPDATE party_members SET role = ?3 WHERE party_id = ?1 AND user_id = ?2",
                )
                .bind(party_id)
                .bind(&new_owner_id)
                .bind(member_roles::OWNER)
                .execute(&mut *tx)
                .await?;
                sqlx::query("UPDATE parties SET owner_id = ?2 WHERE id = ?1")
                    .bind(party_id)
                    .bind(&new_owner_id)
                    .execute(&mut *tx)
                    .await?;
                LeaveOutcome::OwnershipTransferred { new_owner_id }
            }
            Some(_) => LeaveOutcome::Left,
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Disband a party. Only its owner may do so.
    ///
    /// Removes every membership and expires pending invitations.
    pub async fn disband(
        pool: &DbPool,
        party_id: &str,
        user_id: &str,
        now: Timestamp,
    ) -> Result<DisbandOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE parties SET status = ?3, disbanded_at = ?4 \
             WHERE id = ?1 AND owner_id = ?2 AND status = ?5",
        )
        .bind(party_id)
        .bind(user_id)
        .bind(party_status::DISBANDED)
        .bind(now)
        .bind(party_status::ACTIVE)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let query = format!("SELECT {PARTY_COLUMNS} FROM parties WHERE id = ?1");
            let party = sqlx::query_as::<_, Party>(&query)
                .bind(party_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return Ok(match party {
                None => DisbandOutcome::NotFound,
                Some(p) if p.status == party_status::DISBANDED => DisbandOutcome::AlreadyDisbanded,
                Some(_) => DisbandOutcome::NotOwner,
            });
        }

        sqlx::query("DELETE FROM party_members WHERE party_id = ?1")
            .bind(party_id)
            .execute(&mut *tx)
            .await?;
        Self::expire_pending_invitations(&mut tx, party_id, now).await?;

        tx.commit().await?;
        Ok(DisbandOutcome::Disbanded)
    }

    // ── Transaction helpers (shared with the invitation repository) ──────

    /// The active party `user_id` belongs to, read inside `tx`.
    pub(crate) async fn current_party_in(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: &str,
    ) -> Result<Option<Party>, sqlx::Error> {
        let query = format!(
            "SELECT {PARTY_COLUMNS_P} FROM party_members m \
             JOIN parties p ON p.id = m.party_id \
             WHERE m.user_id = ?1 AND p.status = ?2"
        );
        sqlx::query_as::<_, Party>(&query)
            .bind(user_id)
            .bind(party_status::ACTIVE)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Members of `party_id`, oldest first, read inside `tx`.
    pub(crate) async fn members_in(
        tx: &mut Transaction<'_, Sqlite>,
        party_id: &str,
    ) -> Result<Vec<PartyMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM party_members \
             WHERE party_id = ?1 \
             ORDER BY joined_at ASC, rowid ASC"
        );
        sqlx::query_as::<_, PartyMember>(&query)
            .bind(party_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert a membership row inside `tx`.
    ///
    /// Fails with a unique violation on `uq_party_members_user_id` if the user
    /// is already in a party.
    pub(crate) async fn insert_member(
        tx: &mut Transaction<'_, Sqlite>,
        party_id: &str,
        user_id: &str,
        username: &str,
        role: &str,
        now: Timestamp,
    ) -> Result<PartyMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO party_members (party_id, user_id, username, role, joined_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, PartyMember>(&query)
            .bind(party_id)
            .bind(user_id)
            .bind(username)
            .bind(role)
            .bind(now)
            .fetch_one(&mut **tx)
            .await
    }

    async fn mark_disbanded(
        tx: &mut Transaction<'_, Sqlite>,
        party_id: &str,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE parties SET status = ?2, disbanded_at = ?3 WHERE id = ?1")
            .bind(party_id)
            .bind(party_status::DISBANDED)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        Self::expire_pending_invitations(tx, party_id, now).await
    }

    async fn expire_pending_invitations(
        tx: &mut Transaction<'_, Sqlite>,
        party_id: &str,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE party_invitations SET status = ?2, responded_at = ?3 \
             WHERE party_id = ?1 AND status = ?4",
        )
        .bind(party_id)
        .bind(invitation_status::EXPIRED)
        .bind(now)
        .bind(invitation_status::PENDING)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
