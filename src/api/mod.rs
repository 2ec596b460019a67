use std::sync::Arc;
use std::time::Instant;

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use crate::domain::guild_cache::GuildListCache;

pub mod graphql;
pub mod rest;

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct ServiceHealth {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub chain: String,
    /// `None` until the first guild list is built.
    pub guild_list_age_secs: Option<i64>,
    pub guilds: usize,
}

/// Liveness data shared by the REST and GraphQL surfaces.
#[derive(Clone)]
pub struct HealthProbe {
    started: Instant,
    chain: String,
    guilds: Arc<GuildListCache>,
}

impl HealthProbe {
    pub fn new(chain: String, guilds: Arc<GuildListCache>) -> Self {
        Self {
            started: Instant::now(),
            chain,
            guilds,
        }
    }

    pub async fn report(&self) -> ServiceHealth {
        let cached = self.guilds.cached().await;
        ServiceHealth {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: self.started.elapsed().as_secs(),
            chain: self.chain.clone(),
            guild_list_age_secs: cached.as_ref().map(|l| l.age_secs()),
            guilds: cached.map(|l| l.guilds.len()).unwrap_or(0),
        }
    }
}
