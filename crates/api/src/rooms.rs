//! Room catalog: the [`RoomMeta`] list behind the server browser.
//!
//! Room metadata belongs to the room-hosting subsystem, which publishes it as
//! a JSON array file. The catalog holds the last valid copy in memory and is
//! re-read periodically by `background::room_catalog_refresh`. Without a file
//! the built-in catalog is served and never changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lobby_core::server_browser::{default_catalog, validate_catalog, RoomMeta};
use tokio::sync::RwLock;

/// Why a rooms file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read rooms file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rooms file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid room catalog: {0}")]
    Invalid(String),
}

/// In-memory room catalog, swapped atomically on reload.
#[derive(Debug)]
pub struct RoomCatalog {
    source: Option<PathBuf>,
    rooms: RwLock<Arc<Vec<RoomMeta>>>,
}

impl RoomCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            source: None,
            rooms: RwLock::new(Arc::new(default_catalog())),
        }
    }

    /// Load the catalog from `path`, or the built-in one when `path` is `None`.
    pub async fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            None => Ok(Self::builtin()),
            Some(path) => {
                let rooms = read_rooms_file(path).await?;
                Ok(Self {
                    source: Some(path.to_path_buf()),
                    rooms: RwLock::new(Arc::new(rooms)),
                })
            }
        }
    }

    /// Path of the backing file, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The current room list. Cheap; callers hold a snapshot, not the lock.
    pub async fn snapshot(&self) -> Arc<Vec<RoomMeta>> {
        Arc::clone(&*self.rooms.read().await)
    }

    /// Re-read the backing file and swap in its contents.
    ///
    /// Returns the number of rooms now loaded. On error the previous catalog
    /// stays in place. A catalog without a file is left unchanged.
    pub async fn reload(&self) -> Result<usize, CatalogError> {
        let Some(path) = &self.source else {
            return Ok(self.rooms.read().await.len());
        };

        let rooms = read_rooms_file(path).await?;
        let count = rooms.len();
        *self.rooms.write().await = Arc::new(rooms);
        Ok(count)
    }
}

async fn read_rooms_file(path: &Path) -> Result<Vec<RoomMeta>, CatalogError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let rooms: Vec<RoomMeta> =
        serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    validate_catalog(&rooms).map_err(CatalogError::Invalid)?;
    Ok(rooms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const TWO_ROOMS: &str = r#"[
        {"roomId": "a", "displayName": "A", "region": "us", "mode": "free", "minPlayers": 2, "maxPlayers": 4},
        {"roomId": "b", "displayName": "B", "region": "eu", "mode": "staked", "minPlayers": 2, "maxPlayers": 2, "stakeAmount": 5}
    ]"#;

    #[tokio::test]
    async fn test_load_without_path_uses_builtin() {
        let catalog = RoomCatalog::load(None).await.unwrap();
        assert!(catalog.source().is_none());
        assert_eq!(*catalog.snapshot().await, default_catalog());
    }

    #[tokio::test]
    async fn test_load_and_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.json");
        std::fs::write(&path, TWO_ROOMS).unwrap();

        let catalog = RoomCatalog::load(Some(&path)).await.unwrap();
        let rooms = catalog.snapshot().await;
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[1].stake_amount, 5.0);
        assert_eq!(rooms[0].stake_amount, 0.0);

        std::fs::write(
            &path,
            r#"[{"roomId": "c", "displayName": "C", "region": "us", "mode": "free", "minPlayers": 1, "maxPlayers": 10}]"#,
        )
        .unwrap();
        assert_eq!(catalog.reload().await.unwrap(), 1);
        assert_eq!(catalog.snapshot().await[0].room_id, "c");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.json");
        std::fs::write(&path, TWO_ROOMS).unwrap();
        let catalog = RoomCatalog::load(Some(&path)).await.unwrap();

        std::fs::write(&path, "not json").unwrap();
        assert_matches!(catalog.reload().await, Err(CatalogError::Parse { .. }));
        assert_eq!(catalog.snapshot().await.len(), 2);

        std::fs::remove_file(&path).unwrap();
        assert_matches!(catalog.reload().await, Err(CatalogError::Io { .. }));
        assert_eq!(catalog.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_catalog_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.json");
        std::fs::write(
            &path,
            r#"[
                {"roomId": "a", "displayName": "A", "region": "us", "mode": "free", "minPlayers": 2, "maxPlayers": 4},
                {"roomId": "a", "displayName": "A2", "region": "us", "mode": "free", "minPlayers": 2, "maxPlayers": 4}
            ]"#,
        )
        .unwrap();

        assert_matches!(
            RoomCatalog::load(Some(&path)).await,
            Err(CatalogError::Invalid(_))
        );
    }
}
