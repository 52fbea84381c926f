use std::path::PathBuf;

use lobby_core::party::DEFAULT_INVITATION_TTL_SECS;
use lobby_core::presence::{DEFAULT_SESSION_TTL_SECS, DEFAULT_SWEEP_INTERVAL_SECS};

/// Default interval between re-reads of the rooms file.
const DEFAULT_ROOMS_REFRESH_INTERVAL_SECS: u64 = 60;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// SQLite database URL (default: `sqlite://lobby.db`).
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// A game session without a heartbeat for this long is stale (default: `30`).
    pub session_ttl_secs: i64,
    /// How often stale sessions are purged (default: `5`).
    pub session_sweep_interval_secs: u64,
    /// Lifetime of a party invitation from creation (default: `300`).
    pub invitation_ttl_secs: i64,
    /// JSON file holding the room catalog. `None` uses the built-in catalog.
    pub rooms_config_path: Option<PathBuf>,
    /// How often the rooms file is re-read (default: `60`).
    pub rooms_refresh_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `DATABASE_URL`                | `sqlite://lobby.db`        |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SESSION_TTL_SECS`            | `30`                       |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `5`                        |
    /// | `INVITATION_TTL_SECS`         | `300`                      |
    /// | `ROOMS_CONFIG_PATH`           | unset (built-in catalog)   |
    /// | `ROOMS_REFRESH_INTERVAL_SECS` | `60`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://lobby.db".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_ttl_secs: i64 = env_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS);
        assert!(session_ttl_secs > 0, "SESSION_TTL_SECS must be positive");

        let session_sweep_interval_secs: u64 =
            env_or("SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS);
        assert!(
            session_sweep_interval_secs > 0,
            "SESSION_SWEEP_INTERVAL_SECS must be positive"
        );

        let invitation_ttl_secs: i64 = env_or("INVITATION_TTL_SECS", DEFAULT_INVITATION_TTL_SECS);
        assert!(
            invitation_ttl_secs > 0,
            "INVITATION_TTL_SECS must be positive"
        );

        let rooms_config_path = std::env::var("ROOMS_CONFIG_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let rooms_refresh_interval_secs: u64 = env_or(
            "ROOMS_REFRESH_INTERVAL_SECS",
            DEFAULT_ROOMS_REFRESH_INTERVAL_SECS,
        );
        assert!(
            rooms_refresh_interval_secs > 0,
            "ROOMS_REFRESH_INTERVAL_SECS must be positive"
        );

        Self {
            host,
            port,
            database_url,
            cors_origins,
            request_timeout_secs,
            session_ttl_secs,
            session_sweep_interval_secs,
            invitation_ttl_secs,
            rooms_config_path,
            rooms_refresh_interval_secs,
        }
    }
}

/// Parse `name` from the environment, falling back to `default` when unset.
///
/// Panics if the variable is set but unparseable; startup should fail loudly.
fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} is invalid ('{raw}'): {e}")),
        Err(_) => default,
    }
}
