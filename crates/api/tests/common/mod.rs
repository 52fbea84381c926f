//! Shared helpers for HTTP-level integration tests.
//!
//! Each test builds the full application router (same middleware stack as the
//! binary) over a fresh SQLite database in a temporary directory, then drives
//! it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use lobby_api::config::ServerConfig;
use lobby_api::rooms::RoomCatalog;
use lobby_api::router::build_app_router;
use lobby_api::state::AppState;
use lobby_db::DbPool;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and the production TTLs.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session_ttl_secs: 30,
        session_sweep_interval_secs: 5,
        invitation_ttl_secs: 300,
        rooms_config_path: None,
        rooms_refresh_interval_secs: 60,
    }
}

/// A running test application and the database behind it.
///
/// Keep it alive for the whole test; dropping it removes the database.
pub struct TestApp {
    pub app: Router,
    pub pool: DbPool,
    _dir: TempDir,
}

/// Build the full application router over a fresh, migrated database and
/// the built-in room catalog.
pub async fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("lobby.db").display());

    let pool = lobby_db::create_pool(&url)
        .await
        .expect("failed to open test database");
    lobby_db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    let config = test_config();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        rooms: Arc::new(RoomCatalog::builtin()),
    };

    TestApp {
        app: build_app_router(state, &config),
        pool,
        _dir: dir,
    }
}

/// Send a GET request.
pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Find one room's listing in a `GET /servers` body.
pub fn server<'a>(browser: &'a serde_json::Value, room_id: &str) -> &'a serde_json::Value {
    browser["servers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["roomId"] == room_id)
        .unwrap_or_else(|| panic!("room {room_id} missing from server browser"))
}

/// Current player count of one room, read through `GET /servers`.
pub async fn current_players(app: &Router, room_id: &str) -> i64 {
    let browser = body_json(get(app, "/servers").await).await;
    server(&browser, room_id)["currentPlayers"]
        .as_i64()
        .unwrap()
}
