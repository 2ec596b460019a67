use anyhow::{Context, Result};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::graphql::{self, GuildwatchSchema};
use crate::api::rest::{self, AppState};
use crate::api::HealthProbe;
use crate::chain::ChainRpcClient;
use crate::config::Config;
use crate::domain::guild_cache::{refresh_loop, GuildListCache};
use crate::domain::validation_service::ValidationService;
use crate::store::SnapshotStore;

pub async fn run(config: Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        chain = %config.chain.name,
        chain_id = %config.chain.id,
        "guildwatch daemon starting"
    );

    let store = Arc::new(SnapshotStore::open(PathBuf::from(&config.store.snapshot_file)));
    let producers = Arc::new(
        ChainRpcClient::new(
            &config.chain.api_endpoint,
            Duration::from_millis(config.validation.request_timeout_ms),
        )
        .context("building chain RPC client")?,
    );
    let validations = Arc::new(ValidationService::new(&config, store, producers));
    let guilds = Arc::new(GuildListCache::new(validations.clone()));
    let health = HealthProbe::new(config.chain.name.clone(), guilds.clone());

    let app_state = AppState {
        validations: validations.clone(),
        guilds: guilds.clone(),
        health: health.clone(),
    };

    let schema = graphql::build_schema(validations, guilds.clone(), health);

    let graphql_router = Router::new()
        .route("/graphql", get(graphql_playground).post(graphql_handler))
        .with_state(schema);

    let app = rest::router(app_state)
        .merge(graphql_router)
        .layer(TraceLayer::new_for_http());

    let http_addr = &config.http_addr;
    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding to {}", http_addr))?;

    info!(addr = %http_addr, "HTTP server listening");

    // First tick builds the list in the background; the daemon serves
    // immediately and cold reads build on demand.
    if config.cache.refresh_interval_secs > 0 {
        let interval = Duration::from_secs(config.cache.refresh_interval_secs);
        tokio::spawn(refresh_loop(guilds, interval));
    }

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("guildwatch daemon stopped");
    Ok(())
}

async fn graphql_playground() -> Html<String> {
    Html(
        async_graphql::http::playground_source(
            async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
        ),
    )
}

async fn graphql_handler(
    State(schema): State<GuildwatchSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("Received Ctrl+C, shutting down"); },
        _ = terminate => { info!("Received SIGTERM, shutting down"); },
    }
}
