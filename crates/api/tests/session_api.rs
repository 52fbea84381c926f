//! HTTP-level tests for `/session/*`: join, leave, heartbeat and the room
//! roster, observed through the server browser.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, build_test_app, current_players, get, post_json};
use lobby_core::presence::stale_cutoff;
use lobby_db::models::game_session::JoinSession;
use lobby_db::repositories::GameSessionRepo;
use lobby_db::DbPool;
use serde_json::json;

/// Insert a session whose last heartbeat was `secs_ago` seconds in the past.
async fn seed_old_session(pool: &DbPool, room: &str, player: &str, secs_ago: i64) {
    let then = Utc::now() - Duration::seconds(secs_ago);
    GameSessionRepo::upsert(
        pool,
        &JoinSession {
            room_id: room.to_string(),
            player_id: player.to_string(),
            player_name: player.to_string(),
        },
        then,
        stale_cutoff(then, 30),
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Join / leave
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_join_increments_room_count() {
    let t = build_test_app().await;
    assert_eq!(current_players(&t.app, "arena1").await, 0);

    let response = post_json(
        &t.app,
        "/session/join",
        json!({"roomId": "arena1", "playerId": "p1", "playerName": "Alice"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true}));

    assert_eq!(current_players(&t.app, "arena1").await, 1);
}

#[tokio::test]
async fn test_join_twice_is_idempotent() {
    let t = build_test_app().await;
    let body = json!({"roomId": "arena1", "playerId": "p1", "playerName": "Alice"});

    post_json(&t.app, "/session/join", body.clone()).await;
    let response = post_json(&t.app, "/session/join", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(current_players(&t.app, "arena1").await, 1);
}

#[tokio::test]
async fn test_join_then_leave_returns_to_baseline() {
    let t = build_test_app().await;
    post_json(
        &t.app,
        "/session/join",
        json!({"roomId": "arena1", "playerId": "p0", "playerName": "Zed"}),
    )
    .await;
    let baseline = current_players(&t.app, "arena1").await;

    post_json(
        &t.app,
        "/session/join",
        json!({"roomId": "arena1", "playerId": "p1", "playerName": "Alice"}),
    )
    .await;
    assert_eq!(current_players(&t.app, "arena1").await, baseline + 1);

    let response = post_json(
        &t.app,
        "/session/leave",
        json!({"roomId": "arena1", "playerId": "p1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(current_players(&t.app, "arena1").await, baseline);
}

#[tokio::test]
async fn test_leave_without_join_succeeds() {
    let t = build_test_app().await;

    let response = post_json(
        &t.app,
        "/session/leave",
        json!({"roomId": "arena1", "playerId": "ghost"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(current_players(&t.app, "arena1").await, 0);
}

#[tokio::test]
async fn test_join_missing_fields_lists_all_of_them() {
    let t = build_test_app().await;

    let response = post_json(&t.app, "/session/join", json!({"roomId": "arena1"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(
        json["error"],
        "Missing required fields: playerId, playerName"
    );
}

#[tokio::test]
async fn test_join_blank_field_counts_as_missing() {
    let t = build_test_app().await;

    let response = post_json(
        &t.app,
        "/session/join",
        json!({"roomId": "arena1", "playerId": "p1", "playerName": "   "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leave_missing_fields() {
    let t = build_test_app().await;

    let response = post_json(&t.app, "/session/leave", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing required fields: roomId, playerId"
    );
}

#[tokio::test]
async fn test_join_overlong_name_rejected() {
    let t = build_test_app().await;

    let response = post_json(
        &t.app,
        "/session/join",
        json!({"roomId": "arena1", "playerId": "p1", "playerName": "x".repeat(65)}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_stale_session_not_counted() {
    let t = build_test_app().await;
    seed_old_session(&t.pool, "arena1", "stale", 120).await;
    seed_old_session(&t.pool, "arena1", "recent", 5).await;

    assert_eq!(current_players(&t.app, "arena1").await, 1);
}

#[tokio::test]
async fn test_heartbeat_keeps_live_session() {
    let t = build_test_app().await;
    seed_old_session(&t.pool, "arena1", "p1", 20).await;

    let response = post_json(
        &t.app,
        "/session/heartbeat",
        json!({"roomId": "arena1", "playerId": "p1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_heartbeat_without_live_session_is_404() {
    let t = build_test_app().await;
    seed_old_session(&t.pool, "arena1", "stale", 120).await;

    for player in ["stale", "never-joined"] {
        let response = post_json(
            &t.app,
            "/session/heartbeat",
            json!({"roomId": "arena1", "playerId": player}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_room_roster_lists_live_players() {
    let t = build_test_app().await;
    seed_old_session(&t.pool, "arena1", "early", 10).await;
    seed_old_session(&t.pool, "arena1", "stale", 120).await;
    post_json(
        &t.app,
        "/session/join",
        json!({"roomId": "arena1", "playerId": "late", "playerName": "Late"}),
    )
    .await;

    let response = get(&t.app, "/session/room?roomId=arena1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["roomId"], "arena1");
    assert_eq!(json["count"], 2);
    let players = json["players"].as_array().unwrap();
    assert_eq!(players[0]["playerId"], "early");
    assert_eq!(players[1]["playerId"], "late");
    assert_eq!(players[1]["playerName"], "Late");
    assert!(players[1]["joinedAt"].is_string());
    assert!(players[1]["lastHeartbeatAt"].is_string());
}

#[tokio::test]
async fn test_room_roster_requires_room_id() {
    let t = build_test_app().await;

    let response = get(&t.app, "/session/room").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing required fields: roomId"
    );
}
