//! Read-only access to the check rows written by the validation process.

pub mod snapshot;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::report::NodeType;
use crate::domain::status::StatusLevel;

pub use snapshot::{Snapshot, SnapshotStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A single stored check result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    #[serde(default)]
    pub level: StatusLevel,
    /// Group the writer filed the check under.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub http_code: Option<i32>,
    /// Raw transport failure kind, see `HttpErrorKind::parse`.
    #[serde(default)]
    pub error_kind: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    /// Measured value interpolated into messages as `{value}`.
    #[serde(default)]
    pub value: Option<String>,
    /// Base URL of the request when it differs from the node endpoint.
    #[serde(default)]
    pub url: Option<String>,
    /// Request path when it differs from the catalog default.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeValidationRecord {
    pub id: String,
    pub guild: String,
    pub node_type: NodeType,
    pub validation_date: DateTime<Utc>,
    pub endpoint_url: String,
    #[serde(default)]
    pub is_ssl: bool,
    #[serde(default)]
    pub server_version: Option<String>,
    #[serde(default)]
    pub location_latitude: Option<f64>,
    #[serde(default)]
    pub location_longitude: Option<f64>,
    #[serde(default)]
    pub all_checks_ok: StatusLevel,
    #[serde(default)]
    pub checks: Vec<CheckResult>,
}

/// One validation pass of a guild, including its nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub id: String,
    pub guild: String,
    pub validation_date: DateTime<Utc>,
    #[serde(default)]
    pub all_checks_ok: StatusLevel,
    #[serde(default)]
    pub checks: Vec<CheckResult>,
    #[serde(default)]
    pub nodes: Vec<NodeValidationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildRow {
    pub name: String,
    #[serde(default)]
    pub tracked_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<i32>,
    #[serde(default)]
    pub location_alpha: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_logo_256: Option<String>,
}

/// Query surface of the relational store. Time windows are exclusive at
/// `since`: rows strictly newer than `since` are returned.
#[async_trait]
pub trait ValidationStore: Send + Sync {
    async fn validation_by_id(&self, id: &str) -> Result<Option<ValidationRecord>, StoreError>;

    /// Id of the most recent validation of `guild`.
    async fn last_validation_id(&self, guild: &str) -> Result<Option<String>, StoreError>;

    async fn guild_validations_since(
        &self,
        guild: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ValidationRecord>, StoreError>;

    async fn node_validations_since(
        &self,
        guild: &str,
        node_type: NodeType,
        endpoint_url: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<NodeValidationRecord>, StoreError>;

    /// Every node row of `node_type`, across guilds, newer than `since`.
    async fn endpoint_validations_since(
        &self,
        node_type: NodeType,
        since: DateTime<Utc>,
    ) -> Result<Vec<NodeValidationRecord>, StoreError>;

    async fn guilds(&self) -> Result<Vec<GuildRow>, StoreError>;

    async fn guild(&self, name: &str) -> Result<Option<GuildRow>, StoreError>;
}
