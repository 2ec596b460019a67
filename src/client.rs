//! Typed HTTP client for the guildwatch daemon REST API.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use reqwest::Client;

use crate::api::ServiceHealth;
use crate::config::RemoteTarget;
use crate::domain::report::{EndpointSummary, GuildList, GuildValidationReport, NodeType};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

pub struct GuildwatchClient {
    base_url: String,
    http: Client,
}

impl GuildwatchClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// `None` → localhost default. `Some(name)` → look up in the remotes map.
    pub fn from_remote(name: Option<&str>, remotes: &HashMap<String, RemoteTarget>) -> Result<Self> {
        match name {
            None => Self::new(DEFAULT_BASE_URL),
            Some(n) => match remotes.get(n) {
                Some(target) => Self::new(&target.url),
                None => bail!(
                    "remote '{}' not found in config. Available remotes: {}",
                    n,
                    if remotes.is_empty() {
                        "(none configured)".to_string()
                    } else {
                        remotes.keys().cloned().collect::<Vec<_>>().join(", ")
                    }
                ),
            },
        }
    }

    pub async fn health(&self) -> Result<ServiceHealth> {
        self.get("/health").await
    }

    pub async fn guilds(&self) -> Result<GuildList> {
        self.get("/api/v1/guilds").await
    }

    pub async fn refresh_guilds(&self) -> Result<GuildList> {
        self.post("/api/v1/guilds/refresh").await
    }

    pub async fn validation(&self, id: &str) -> Result<GuildValidationReport> {
        self.get(&format!("/api/v1/validations/{}", id)).await
    }

    pub async fn latest_validation(&self, guild: &str) -> Result<GuildValidationReport> {
        self.get(&format!("/api/v1/guilds/{}/validation", guild)).await
    }

    pub async fn endpoints(
        &self,
        node_type: NodeType,
        lookback_ms: Option<u64>,
        only_healthy: bool,
    ) -> Result<Vec<EndpointSummary>> {
        let mut path = format!(
            "/api/v1/endpoints?node_type={}&only_healthy={}",
            node_type, only_healthy
        );
        if let Some(ms) = lookback_ms {
            path.push_str(&format!("&lookback_ms={}", ms));
        }
        self.get(&path).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", url, status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("parsing response from {}", url))
    }

    async fn post<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", url, status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("parsing response from {}", url))
    }
}
