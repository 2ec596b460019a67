use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::check::HttpMethod;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http_addr: String,
    pub log_level: String,
    pub store: StoreConfig,
    pub validation: ValidationConfig,
    pub cache: CacheConfig,
    pub chain: ChainConfig,
    /// Request templates keyed by `<scope>.<check>`.
    pub requests: BTreeMap<String, RequestTemplate>,
    /// Named daemons for `guildwatch query --remote`.
    pub remotes: HashMap<String, RemoteTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            store: StoreConfig::default(),
            validation: ValidationConfig::default(),
            cache: CacheConfig::default(),
            chain: ChainConfig::default(),
            requests: default_requests(),
            remotes: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON export of the validation tables.
    pub snapshot_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("guildwatch")
            .join("snapshot.json");
        Self {
            snapshot_file: path.to_string_lossy().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// History window for `SuccessAll`. Only covers the current validation
    /// batch; raising it turns the level into a trend indicator.
    pub lookback_ms: u64,
    /// Timeout the validation process applies to its requests.
    pub request_timeout_ms: u64,
    /// Default window for endpoint listings.
    pub endpoint_lookback_ms: u64,
    pub availability_days: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            lookback_ms: 3_000,
            request_timeout_ms: 10_000,
            endpoint_lookback_ms: 3_600_000,
            availability_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub refresh_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub id: String,
    pub name: String,
    /// Chain API used to fetch producer votes.
    pub api_endpoint: String,
    pub producer_limit: u32,
    /// Values for request template tokens.
    pub variables: BTreeMap<String, String>,
    /// Checks not rendered on this chain, as `<scope>.<check>`.
    pub disabled_checks: Vec<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            id: "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906".to_string(),
            name: "eos".to_string(),
            api_endpoint: "https://eos.greymass.com".to_string(),
            producer_limit: 500,
            variables: BTreeMap::new(),
            disabled_checks: Vec::new(),
        }
    }
}

impl ChainConfig {
    pub fn is_enabled(&self, scope: &str, check: &str) -> bool {
        !self
            .disabled_checks
            .iter()
            .any(|entry| entry.split_once('.') == Some((scope, check)))
    }
}

/// Request issued by a configured check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTemplate {
    pub path: String,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub method: HttpMethod,
    /// Tokens substituted from `chain.variables`.
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTarget {
    pub url: String,
}

fn get(path: &str) -> RequestTemplate {
    RequestTemplate {
        path: path.to_string(),
        payload: None,
        method: HttpMethod::Get,
        variables: Vec::new(),
    }
}

fn post(path: &str, payload: &str, variables: &[&str]) -> RequestTemplate {
    RequestTemplate {
        path: path.to_string(),
        payload: Some(payload.to_string()),
        method: HttpMethod::Post,
        variables: variables.iter().map(|v| v.to_string()).collect(),
    }
}

fn default_requests() -> BTreeMap<String, RequestTemplate> {
    let entries = [
        ("api.get_info", get("/v1/chain/get_info")),
        ("api.block_one", post("/v1/chain/get_block", r#"{"block_num_or_id": "1", "json": true}"#, &[])),
        ("api.verbose_error", get("/v1/chain/should_return_error")),
        ("api.abi_serializer", post("/v1/chain/get_block", r#"{"block_num_or_id": "ABI_SERIALIZER_BLOCK", "json": true}"#, &["ABI_SERIALIZER_BLOCK"])),
        ("api.basic_symbol", post("/v1/chain/get_currency_balance", r#"{"code": "eosio.token", "account": "BASIC_SYMBOL_ACCOUNT", "symbol": "CORE_SYMBOL"}"#, &["BASIC_SYMBOL_ACCOUNT", "CORE_SYMBOL"])),
        ("api.producer_api", get("/v1/producer/paused")),
        ("api.db_size_api", get("/v1/db_size/get")),
        ("api.net_api", get("/v1/net/connections")),
        ("wallet.accounts", post("/v1/chain/get_accounts_by_authorizers", r#"{"accounts": ["WALLET_ACCOUNT"]}"#, &["WALLET_ACCOUNT"])),
        ("wallet.keys", post("/v1/chain/get_accounts_by_authorizers", r#"{"keys": ["WALLET_PUBLIC_KEY"]}"#, &["WALLET_PUBLIC_KEY"])),
        ("history.get_transaction", post("/v1/history/get_transaction", r#"{"json": true, "id": "HISTORY_TRANSACTION_ID"}"#, &["HISTORY_TRANSACTION_ID"])),
        ("history.get_actions", post("/v1/history/get_actions", r#"{"json": true, "pos": -1, "offset": -100, "account_name": "eosio.token"}"#, &[])),
        ("history.get_key_accounts", post("/v1/history/get_key_accounts", r#"{"json": true, "public_key": "WALLET_PUBLIC_KEY"}"#, &["WALLET_PUBLIC_KEY"])),
        ("history.get_controlled_accounts", post("/v1/history/get_controlled_accounts", r#"{"json": true, "controlling_account": "eosio"}"#, &[])),
        ("indexer.health", get("/v2/health")),
        ("indexer.get_transaction", get("/v2/history/get_transaction?id=HISTORY_TRANSACTION_ID")),
        ("indexer.get_actions", get("/v2/history/get_actions?limit=1")),
        ("indexer.get_key_accounts", get("/v2/state/get_key_accounts?public_key=WALLET_PUBLIC_KEY")),
        ("indexer.get_created_accounts", get("/v2/history/get_created_accounts?account=eosio")),
        ("asset_index.health", get("/health")),
        ("asset_index.assets", get("/atomicassets/v1/assets?limit=1")),
        ("asset_index.collections", get("/atomicassets/v1/collections?limit=1")),
        ("asset_index.schemas", get("/atomicassets/v1/schemas?limit=1")),
        ("asset_index.templates", get("/atomicassets/v1/templates?limit=1")),
    ];
    entries
        .into_iter()
        .map(|(key, template)| (key.to_string(), template))
        .collect()
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("guildwatch").join("config.yaml"))
    }
}

/// Load config: built-in defaults, then the YAML file (if present), then
/// `GUILDWATCH_*` environment variables (`__` separates nested keys).
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::path()?,
    };

    Figment::from(Serialized::defaults(Config::default()))
        .merge(Yaml::file(&path))
        .merge(Env::prefixed("GUILDWATCH_").split("__"))
        .extract()
        .with_context(|| format!("loading config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(Some(&dir.path().join("missing.yaml"))).unwrap();
        assert_eq!(cfg.validation.lookback_ms, 3_000);
        assert_eq!(cfg.cache.refresh_interval_secs, 60);
        assert!(cfg.requests.contains_key("api.get_info"));
    }

    #[test]
    fn yaml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
http_addr: "127.0.0.1:9200"
validation:
  lookback_ms: 5000
chain:
  name: wax
  variables:
    CORE_SYMBOL: WAX
  disabled_checks: ["api.net_api"]
requests:
  api.get_info:
    path: /v1/chain/get_info
    method: POST
  api.chain_status:
    path: /v1/chain/get_status
"#,
        )
        .unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.http_addr, "127.0.0.1:9200");
        assert_eq!(cfg.validation.lookback_ms, 5_000);
        assert_eq!(cfg.validation.request_timeout_ms, 10_000);
        assert_eq!(cfg.chain.name, "wax");
        assert_eq!(cfg.chain.variables["CORE_SYMBOL"], "WAX");
        assert_eq!(cfg.requests["api.get_info"].method, HttpMethod::Post);
        assert!(cfg.requests.contains_key("indexer.health"));
        assert_eq!(cfg.requests["api.chain_status"].method, HttpMethod::Get);
        assert!(!cfg.chain.is_enabled("api", "net_api"));
        assert!(cfg.chain.is_enabled("api", "get_info"));
    }
}
