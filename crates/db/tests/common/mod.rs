//! Shared helpers for repository integration tests.
//!
//! Each test gets its own SQLite file in a temporary directory, migrated to
//! the current schema. Keep the returned [`TestDb`] alive for the whole test;
//! dropping it removes the directory.

#![allow(dead_code)]

use chrono::TimeZone;
use lobby_core::types::Timestamp;
use lobby_db::DbPool;
use tempfile::TempDir;

pub struct TestDb {
    pub pool: DbPool,
    _dir: TempDir,
}

/// Create a fresh, migrated database.
pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("lobby.db").display());

    let pool = lobby_db::create_pool(&url)
        .await
        .expect("failed to open test database");
    lobby_db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    TestDb { pool, _dir: dir }
}

/// A fixed instant `secs` seconds after an arbitrary epoch.
pub fn at(secs: i64) -> Timestamp {
    chrono::Utc.timestamp_opt(1_800_000_000 + secs, 0).unwrap()
}
