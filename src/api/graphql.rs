use async_graphql::{Context, EmptySubscription, Object, Schema};
use std::sync::Arc;
use tracing::info;

use crate::domain::guild_cache::GuildListCache;
use crate::domain::report::{EndpointSummary, GuildRecord, GuildValidationReport, NodeType};
use crate::domain::validation_service::ValidationService;

use super::{HealthProbe, ServiceHealth};

pub type GuildwatchSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn health(&self, ctx: &Context<'_>) -> async_graphql::Result<ServiceHealth> {
        let probe = ctx.data::<HealthProbe>()?;
        Ok(probe.report().await)
    }

    /// One validation pass with rendered checks. Null when the id is unknown.
    async fn validation_by_id(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<Option<GuildValidationReport>> {
        info!(id = %id, "[request] validation");
        let svc = ctx.data::<Arc<ValidationService>>()?;
        svc.check_bundle(&id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }

    /// Most recent validation of a guild.
    async fn validation_by_guild(
        &self,
        ctx: &Context<'_>,
        guild: String,
    ) -> async_graphql::Result<Option<GuildValidationReport>> {
        info!(guild = %guild, "[request] latest validation");
        let svc = ctx.data::<Arc<ValidationService>>()?;
        svc.latest_check_bundle(&guild)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }

    /// Cached guild list.
    async fn guilds(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GuildRecord>> {
        info!("[request] guild list");
        let cache = ctx.data::<Arc<GuildListCache>>()?;
        let list = cache
            .get()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(list.guilds.clone())
    }

    async fn endpoints(
        &self,
        ctx: &Context<'_>,
        node_type: NodeType,
        lookback_ms: Option<u64>,
        #[graphql(default = false)] only_healthy: bool,
    ) -> async_graphql::Result<Vec<EndpointSummary>> {
        info!(node_type = %node_type, only_healthy, "[request] endpoints");
        let svc = ctx.data::<Arc<ValidationService>>()?;
        svc.endpoints(node_type, lookback_ms, only_healthy)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Rebuild the guild list now and return it.
    async fn refresh_guilds(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GuildRecord>> {
        let cache = ctx.data::<Arc<GuildListCache>>()?;
        let list = cache
            .refresh()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(list.guilds.clone())
    }
}

pub fn build_schema(
    validations: Arc<ValidationService>,
    guilds: Arc<GuildListCache>,
    health: HealthProbe,
) -> GuildwatchSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(validations)
        .data(guilds)
        .data(health)
        .finish()
}
