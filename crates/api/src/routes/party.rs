//! Route definitions for parties and party invitations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::party;
use crate::state::AppState;

/// Party routes mounted at `/party`.
///
/// ```text
/// GET    /current?userId=       -> current_party
/// POST   /create                -> create_party
/// POST   /leave                 -> leave_party
/// POST   /disband               -> disband_party
/// POST   /invite                -> invite
/// GET    /invitations?userId=   -> list_invitations
/// POST   /accept-invitation     -> accept_invitation
/// POST   /decline-invitation    -> decline_invitation
/// GET    /{party_id}            -> get_party
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current", get(party::current_party))
        .route("/create", post(party::create_party))
        .route("/leave", post(party::leave_party))
        .route("/disband", post(party::disband_party))
        .route("/invite", post(party::invite))
        .route("/invitations", get(party::list_invitations))
        .route("/accept-invitation", post(party::accept_invitation))
        .route("/decline-invitation", post(party::decline_invitation))
        .route("/{party_id}", get(party::get_party))
}
