//! Guild list cache.
//!
//! Holds the last successfully assembled [`GuildList`]. Readers get the
//! committed snapshot without waiting on a refresh; only a cold cache makes
//! the caller build the list. A failed refresh keeps the previous snapshot.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::report::GuildList;

/// Produces a full guild list from the store and the chain.
#[async_trait]
pub trait GuildListBuilder: Send + Sync {
    async fn build_guild_list(&self) -> Result<GuildList>;
}

pub struct GuildListCache {
    builder: Arc<dyn GuildListBuilder>,
    slot: RwLock<Option<Arc<GuildList>>>,
    refresh_lock: Mutex<()>,
}

impl GuildListCache {
    pub fn new(builder: Arc<dyn GuildListBuilder>) -> Self {
        Self {
            builder,
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current list. A cold cache is built once, even under concurrent
    /// callers; the error is returned only if that first build fails.
    pub async fn get(&self) -> Result<Arc<GuildList>> {
        if let Some(list) = self.cached().await {
            return Ok(list);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(list) = self.cached().await {
            return Ok(list);
        }

        info!("guild list cache is cold, building synchronously");
        let list = Arc::new(self.builder.build_guild_list().await?);
        *self.slot.write().await = Some(list.clone());
        Ok(list)
    }

    /// Committed snapshot, if any. Never builds.
    pub async fn cached(&self) -> Option<Arc<GuildList>> {
        self.slot.read().await.clone()
    }

    /// Rebuild and replace the slot. Waits for an in-flight refresh.
    pub async fn refresh(&self) -> Result<Arc<GuildList>> {
        let _guard = self.refresh_lock.lock().await;
        self.rebuild().await
    }

    /// Scheduled refresh. Skipped when another refresh holds the lock;
    /// failures are logged and the previous list stays in place.
    pub async fn tick(&self) {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            debug!("guild list refresh already in flight, skipping tick");
            return;
        };
        if let Err(e) = self.rebuild().await {
            warn!(error = %e, "guild list refresh failed, keeping previous list");
        }
    }

    async fn rebuild(&self) -> Result<Arc<GuildList>> {
        let list = Arc::new(self.builder.build_guild_list().await?);
        info!(guilds = list.guilds.len(), "guild list refreshed");
        *self.slot.write().await = Some(list.clone());
        Ok(list)
    }
}

/// Refresh `cache` every `interval` until the task is dropped. The first
/// tick fires immediately; missed ticks are skipped, not bunched.
pub async fn refresh_loop(cache: Arc<GuildListCache>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        cache.tick().await;
    }
}
