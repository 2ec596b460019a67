//! SnapshotStore — serves queries from a JSON export of the validation tables.
//!
//! The validation process exports `{ guilds, validations }` to a file. The
//! file is re-read whenever its modification time changes, so a fresh export
//! is picked up without restarting the daemon.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::report::NodeType;

use super::{GuildRow, NodeValidationRecord, StoreError, ValidationRecord, ValidationStore};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub guilds: Vec<GuildRow>,
    #[serde(default)]
    pub validations: Vec<ValidationRecord>,
}

struct Loaded {
    modified: Option<SystemTime>,
    snapshot: Arc<Snapshot>,
}

pub struct SnapshotStore {
    path: Option<PathBuf>,
    loaded: RwLock<Option<Loaded>>,
}

impl SnapshotStore {
    /// Store backed by a snapshot file. Nothing is read until the first query.
    pub fn open(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            loaded: RwLock::new(None),
        }
    }

    /// Store over an in-memory snapshot that never changes.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            path: None,
            loaded: RwLock::new(Some(Loaded {
                modified: None,
                snapshot: Arc::new(snapshot),
            })),
        }
    }

    /// Current snapshot, reloading from disk if the file changed.
    pub async fn current(&self) -> Result<Arc<Snapshot>, StoreError> {
        let Some(path) = &self.path else {
            return self
                .loaded
                .read()
                .await
                .as_ref()
                .map(|l| l.snapshot.clone())
                .ok_or_else(|| StoreError::Unavailable("empty in-memory snapshot".into()));
        };

        let modified = tokio::fs::metadata(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?
            .modified()
            .ok();

        if let Some(loaded) = self.loaded.read().await.as_ref() {
            if modified.is_some() && loaded.modified == modified {
                return Ok(loaded.snapshot.clone());
            }
        }

        let mut slot = self.loaded.write().await;
        // Another reader may have reloaded while we waited for the lock.
        if let Some(loaded) = slot.as_ref() {
            if modified.is_some() && loaded.modified == modified {
                return Ok(loaded.snapshot.clone());
            }
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;

        info!(
            path = %path.display(),
            guilds = snapshot.guilds.len(),
            validations = snapshot.validations.len(),
            "loaded validation snapshot"
        );

        let snapshot = Arc::new(snapshot);
        *slot = Some(Loaded {
            modified,
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }
}

#[async_trait]
impl ValidationStore for SnapshotStore {
    async fn validation_by_id(&self, id: &str) -> Result<Option<ValidationRecord>, StoreError> {
        let snapshot = self.current().await?;
        Ok(snapshot.validations.iter().find(|v| v.id == id).cloned())
    }

    async fn last_validation_id(&self, guild: &str) -> Result<Option<String>, StoreError> {
        let snapshot = self.current().await?;
        Ok(snapshot
            .validations
            .iter()
            .filter(|v| v.guild == guild)
            .max_by_key(|v| v.validation_date)
            .map(|v| v.id.clone()))
    }

    async fn guild_validations_since(
        &self,
        guild: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ValidationRecord>, StoreError> {
        let snapshot = self.current().await?;
        Ok(snapshot
            .validations
            .iter()
            .filter(|v| v.guild == guild && v.validation_date > since)
            .cloned()
            .collect())
    }

    async fn node_validations_since(
        &self,
        guild: &str,
        node_type: NodeType,
        endpoint_url: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<NodeValidationRecord>, StoreError> {
        let snapshot = self.current().await?;
        let rows: Vec<NodeValidationRecord> = snapshot
            .validations
            .iter()
            .filter(|v| v.guild == guild)
            .flat_map(|v| v.nodes.iter())
            .filter(|n| {
                n.node_type == node_type
                    && n.endpoint_url == endpoint_url
                    && n.validation_date > since
            })
            .cloned()
            .collect();
        debug!(guild, %node_type, endpoint_url, rows = rows.len(), "node history lookup");
        Ok(rows)
    }

    async fn endpoint_validations_since(
        &self,
        node_type: NodeType,
        since: DateTime<Utc>,
    ) -> Result<Vec<NodeValidationRecord>, StoreError> {
        let snapshot = self.current().await?;
        Ok(snapshot
            .validations
            .iter()
            .flat_map(|v| v.nodes.iter())
            .filter(|n| n.node_type == node_type && n.validation_date > since)
            .cloned()
            .collect())
    }

    async fn guilds(&self) -> Result<Vec<GuildRow>, StoreError> {
        Ok(self.current().await?.guilds.clone())
    }

    async fn guild(&self, name: &str) -> Result<Option<GuildRow>, StoreError> {
        let snapshot = self.current().await?;
        Ok(snapshot.guilds.iter().find(|g| g.name == name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::StatusLevel;
    use chrono::TimeZone;

    const SNAPSHOT: &str = r#"{
        "guilds": [{ "name": "eosnationftw", "url": "https://eosnation.io" }],
        "validations": [
            { "id": "1", "guild": "eosnationftw", "validation_date": "2026-10-01T10:00:00Z", "all_checks_ok": 1 },
            { "id": "2", "guild": "eosnationftw", "validation_date": "2026-10-01T10:05:00Z", "all_checks_ok": 4,
              "nodes": [{ "id": "n1", "guild": "eosnationftw", "node_type": "api",
                          "validation_date": "2026-10-01T10:05:00Z",
                          "endpoint_url": "https://api.eosn.io", "all_checks_ok": "success" }] }
        ]
    }"#;

    #[tokio::test]
    async fn reads_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let store = SnapshotStore::open(path);
        assert_eq!(
            store.last_validation_id("eosnationftw").await.unwrap().as_deref(),
            Some("2")
        );
        assert!(store.validation_by_id("3").await.unwrap().is_none());

        let first = store.validation_by_id("1").await.unwrap().unwrap();
        assert_eq!(first.all_checks_ok, StatusLevel::Error);

        let since = Utc.with_ymd_and_hms(2026, 10, 1, 10, 0, 0).unwrap();
        let window = store.guild_validations_since("eosnationftw", since).await.unwrap();
        assert_eq!(window.len(), 1);

        let api = store.endpoint_validations_since(NodeType::Api, since).await.unwrap();
        assert_eq!(api.len(), 1);
        assert_eq!(api[0].all_checks_ok, StatusLevel::Success);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("absent.json"));
        assert!(matches!(store.guilds().await, Err(StoreError::Io { .. })));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = SnapshotStore::open(path);
        assert!(matches!(store.guilds().await, Err(StoreError::Parse { .. })));
    }
}
