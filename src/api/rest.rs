use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::guild_cache::GuildListCache;
use crate::domain::report::{EndpointSummary, GuildList, GuildValidationReport, NodeType};
use crate::domain::validation_service::{ServiceError, ValidationService};

use super::{HealthProbe, ServiceHealth};

/// Shared application state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub validations: Arc<ValidationService>,
    pub guilds: Arc<GuildListCache>,
    pub health: HealthProbe,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/guilds", get(guilds))
        .route("/api/v1/guilds/refresh", post(refresh_guilds))
        .route("/api/v1/guilds/{name}/validation", get(latest_validation))
        .route("/api/v1/validations/{id}", get(validation))
        .route("/api/v1/endpoints", get(endpoints))
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn service_error(e: ServiceError) -> ApiError {
    let status = match e {
        ServiceError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::InvalidLookback(_) => StatusCode::BAD_REQUEST,
    };
    (status, e.to_string())
}

async fn health(State(state): State<AppState>) -> Json<ServiceHealth> {
    Json(state.health.report().await)
}

/// Serve the cached guild list. Builds it only when the cache is cold.
async fn guilds(State(state): State<AppState>) -> Result<Json<GuildList>, ApiError> {
    info!("[request] guild list");
    state
        .guilds
        .get()
        .await
        .map(|list| Json(list.as_ref().clone()))
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
}

async fn refresh_guilds(State(state): State<AppState>) -> Result<Json<GuildList>, ApiError> {
    info!("[request] guild list refresh");
    state
        .guilds
        .refresh()
        .await
        .map(|list| Json(list.as_ref().clone()))
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
}

async fn latest_validation(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<GuildValidationReport>, ApiError> {
    info!(guild = %name, "[request] latest validation");
    state
        .validations
        .latest_check_bundle(&name)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("no validation recorded for guild '{}'", name),
            )
        })
}

async fn validation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GuildValidationReport>, ApiError> {
    info!(id = %id, "[request] validation");
    state
        .validations
        .check_bundle(&id)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("validation '{}' not found", id)))
}

#[derive(Debug, Deserialize)]
struct EndpointQuery {
    node_type: String,
    lookback_ms: Option<u64>,
    #[serde(default)]
    only_healthy: bool,
}

async fn endpoints(
    State(state): State<AppState>,
    Query(query): Query<EndpointQuery>,
) -> Result<Json<Vec<EndpointSummary>>, ApiError> {
    let node_type: NodeType = query
        .node_type
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
    info!(
        node_type = %node_type,
        lookback_ms = ?query.lookback_ms,
        only_healthy = query.only_healthy,
        "[request] endpoints"
    );
    state
        .validations
        .endpoints(node_type, query.lookback_ms, query.only_healthy)
        .await
        .map(Json)
        .map_err(service_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn service_errors_map_to_status() {
        let (status, _) = service_error(ServiceError::InvalidLookback(u64::MAX));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = service_error(ServiceError::DataUnavailable(StoreError::Unavailable(
            "snapshot missing".into(),
        )));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("snapshot missing"));
    }
}
