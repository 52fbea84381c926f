//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&DbPool` as the first argument and a caller-supplied `now`, so expiry
//! logic is deterministic under test.

pub mod game_session_repo;
pub mod party_invitation_repo;
pub mod party_repo;

pub use game_session_repo::GameSessionRepo;
pub use party_invitation_repo::{
    AcceptOutcome, DeclineOutcome, InviteOutcome, PartyInvitationRepo,
};
pub use party_repo::{CreatePartyOutcome, DisbandOutcome, LeaveOutcome, PartyRepo};
