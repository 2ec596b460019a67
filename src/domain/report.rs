//! Report types served to API consumers.
//!
//! Everything here is derived from stored check rows on each read (or on a
//! guild-list refresh) and never persisted.

use std::fmt;
use std::str::FromStr;

use async_graphql::{ComplexObject, Context, Enum, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::check::CheckDescriptor;
use super::status::StatusLevel;
use super::validation_service::ValidationService;

/// Infrastructure category a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Seed,
    Api,
    Wallet,
    History,
    /// Full-text action/transaction indexer (Hyperion).
    Indexer,
    /// NFT asset index (AtomicAssets).
    AssetIndex,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Seed,
        NodeType::Api,
        NodeType::Wallet,
        NodeType::History,
        NodeType::Indexer,
        NodeType::AssetIndex,
    ];

    /// Category name used in guild infrastructure summaries.
    pub fn category(self) -> &'static str {
        match self {
            NodeType::Seed => "seed",
            NodeType::Api => "api",
            NodeType::Wallet => "wallet",
            NodeType::History => "history",
            NodeType::Indexer => "indexer",
            NodeType::AssetIndex => "asset-index",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let normalized = normalized.strip_prefix("node-").unwrap_or(&normalized);
        match normalized {
            "seed" | "p2p" => Ok(NodeType::Seed),
            "api" => Ok(NodeType::Api),
            "wallet" => Ok(NodeType::Wallet),
            "history" => Ok(NodeType::History),
            "indexer" | "hyperion" => Ok(NodeType::Indexer),
            "asset-index" | "atomic" => Ok(NodeType::AssetIndex),
            other => Err(format!("unknown node type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct AvailabilityPoint {
    pub date: NaiveDate,
    /// Percentage of passing validations on that day.
    pub availability: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct NodeStatistics {
    pub availability: Vec<AvailabilityPoint>,
}

/// One node's rendered checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct NodeReport {
    pub id: String,
    pub guild: String,
    pub node_type: NodeType,
    pub validation_date: DateTime<Utc>,
    pub endpoint_url: String,
    pub is_ssl: bool,
    pub server_version: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub overall_level: StatusLevel,
    pub checks: Vec<CheckDescriptor>,
    pub statistics: NodeStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct NodeGroup {
    pub node_type: NodeType,
    pub nodes: Vec<NodeReport>,
}

/// A guild's full validation pass: organization checks plus every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct GuildValidationReport {
    pub id: String,
    pub guild: String,
    pub validation_date: DateTime<Utc>,
    pub guild_logo_url: Option<String>,
    pub overall_level: StatusLevel,
    pub checks: Vec<CheckDescriptor>,
    pub nodes: Vec<NodeGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct CategorySummary {
    pub category: String,
    pub level: StatusLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct GuildRecord {
    pub name: String,
    pub tracked_since: Option<DateTime<Utc>>,
    pub location: Option<i32>,
    pub location_alpha: Option<String>,
    pub url: Option<String>,
    pub logo_url: Option<String>,
    pub rank: Option<u32>,
    pub infrastructure: Vec<CategorySummary>,
    pub last_validation_id: Option<String>,
}

#[ComplexObject]
impl GuildRecord {
    /// Full report of the latest validation. Rendered on demand, not cached.
    async fn last_validation(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<GuildValidationReport>> {
        let Some(id) = self.last_validation_id.as_deref() else {
            return Ok(None);
        };
        let svc = ctx.data::<Arc<ValidationService>>()?;
        svc.check_bundle(id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}

/// Assembled guild list as held by the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct GuildList {
    pub built_at: DateTime<Utc>,
    pub guilds: Vec<GuildRecord>,
}

impl GuildList {
    pub fn new(guilds: Vec<GuildRecord>) -> Self {
        Self {
            built_at: Utc::now(),
            guilds,
        }
    }

    /// Seconds since the list was built.
    pub fn age_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.built_at).num_seconds()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct EndpointSummary {
    pub endpoint_url: String,
    pub guild: String,
    pub is_ssl: bool,
    pub coordinates: Option<Coordinates>,
    pub server_version: Option<String>,
    pub overall_level: StatusLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_aliases() {
        assert_eq!("NODE_HYPERION".parse::<NodeType>(), Ok(NodeType::Indexer));
        assert_eq!("asset_index".parse::<NodeType>(), Ok(NodeType::AssetIndex));
        assert_eq!("Api".parse::<NodeType>(), Ok(NodeType::Api));
        assert!("validator".parse::<NodeType>().is_err());
    }

    #[test]
    fn categories_are_stable() {
        let names: Vec<&str> = NodeType::ALL.iter().map(|t| t.category()).collect();
        assert_eq!(names, ["seed", "api", "wallet", "history", "indexer", "asset-index"]);
    }
}
