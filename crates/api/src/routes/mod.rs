pub mod health;
pub mod party;
pub mod servers;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the public route tree.
///
/// Route hierarchy:
///
/// ```text
/// /session/join                                    join room (POST)
/// /session/leave                                   leave room (POST)
/// /session/heartbeat                               keep session alive (POST)
/// /session/room?roomId=                            live roster of one room
///
/// /servers                                         server browser
///
/// /party/current?userId=                           caller's active party
/// /party/create                                    create party (POST)
/// /party/leave                                     leave party (POST)
/// /party/disband                                   disband party, owner only (POST)
/// /party/invite                                    invite user (POST)
/// /party/invitations?userId=                       pending invitations
/// /party/accept-invitation                         accept (POST)
/// /party/decline-invitation                        decline (POST)
/// /party/{party_id}                                party with members
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/session", session::router())
        .nest("/servers", servers::router())
        .nest("/party", party::router())
}
