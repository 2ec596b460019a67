//! Validation service — turns stored check rows into reports.
//!
//! Every call reads the store afresh; nothing here holds mutable state, so
//! independent requests can run concurrently. The guild list is the one
//! expensive read and is served through [`GuildListCache`].
//!
//! [`GuildListCache`]: super::guild_cache::GuildListCache

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chain::ProducerSource;
use crate::config::{ChainConfig, Config, RequestTemplate, ValidationConfig};
use crate::store::{
    CheckResult, GuildRow, NodeValidationRecord, StoreError, ValidationRecord, ValidationStore,
};

use super::aggregate::guild_infrastructure;
use super::availability::daily_availability;
use super::catalog::{checks_for, interpolate, CheckSpec, RequestSource, Scope};
use super::check::{
    build_check, build_request_check, build_request_check_from_config, CheckDescriptor,
    CheckText, RequestOutcome, RequestTarget,
};
use super::endpoints::{coordinates, summarize_endpoints};
use super::guild_cache::GuildListBuilder;
use super::rank::resolve_ranks;
use super::report::{
    EndpointSummary, GuildList, GuildRecord, GuildValidationReport, NodeGroup, NodeReport,
    NodeStatistics, NodeType,
};
use super::status::{combine_with_history, StatusLevel};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] StoreError),
    #[error("invalid lookback: {0} ms reaches past the earliest representable date")]
    InvalidLookback(u64),
}

/// `end` moved back by `ms`, or `None` when that leaves the date range.
fn checked_window_start(end: DateTime<Utc>, ms: u64) -> Option<DateTime<Utc>> {
    i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .and_then(|span| end.checked_sub_signed(span))
}

/// Renders stored check results through the catalog.
pub struct CheckRenderer {
    chain: ChainConfig,
    requests: BTreeMap<String, RequestTemplate>,
    timeout_ms: u64,
}

impl CheckRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            chain: config.chain.clone(),
            requests: config.requests.clone(),
            timeout_ms: config.validation.request_timeout_ms,
        }
    }

    /// Render `results` in catalog order, then any results the catalog does
    /// not know about.
    pub fn render(
        &self,
        scope: Scope,
        results: &[CheckResult],
        history: &HashMap<String, Vec<StatusLevel>>,
        endpoint_url: &str,
        is_ssl: bool,
    ) -> Vec<CheckDescriptor> {
        let catalog = checks_for(scope);
        let by_name: HashMap<&str, &CheckResult> =
            results.iter().map(|r| (r.name.as_str(), r)).collect();
        let no_history = Vec::new();

        let mut rendered = Vec::with_capacity(results.len());
        for spec in catalog {
            let Some(result) = by_name.get(spec.name) else {
                continue;
            };
            if spec.ssl_only && !is_ssl {
                continue;
            }
            if !self.chain.is_enabled(scope.label(), spec.name) {
                debug!(scope = scope.label(), check = spec.name, "check disabled for chain");
                continue;
            }
            let history = history.get(spec.name).unwrap_or(&no_history);
            rendered.push(self.render_known(spec, result, history, endpoint_url));
        }

        for result in results {
            if catalog.iter().any(|spec| spec.name == result.name)
                || !self.chain.is_enabled(scope.label(), &result.name)
            {
                continue;
            }
            let history = history.get(&result.name).unwrap_or(&no_history);
            rendered.push(self.render_unknown(scope, result, history));
        }

        rendered
    }

    fn render_known(
        &self,
        spec: &CheckSpec,
        result: &CheckResult,
        history: &[StatusLevel],
        endpoint_url: &str,
    ) -> CheckDescriptor {
        let value = result.value.as_deref();
        let success = interpolate(spec.success, value);
        let failure = interpolate(spec.failure, value);
        let prefix = interpolate(spec.prefix, value);
        let text = CheckText {
            header: spec.header,
            prefix: &prefix,
            success: &success,
            failure: &failure,
        };
        let outcome = RequestOutcome {
            duration_ms: result.duration_ms,
            http_code: result.http_code,
            error_kind: result.error_kind.clone(),
        };
        let target = RequestTarget {
            endpoint_url: result.url.as_deref().unwrap_or(endpoint_url),
            timeout_ms: self.timeout_ms,
        };
        let detail = result.detail.clone();

        match spec.request {
            RequestSource::None => CheckDescriptor::Validation(build_check(
                spec.name,
                result.level,
                history,
                &text,
                detail,
            )),
            RequestSource::Fixed { path } => CheckDescriptor::Request(build_request_check(
                spec.name,
                result.level,
                history,
                &text,
                detail,
                &target,
                result.path.as_deref().or(path),
                &outcome,
            )),
            RequestSource::Configured { key } => {
                CheckDescriptor::Request(build_request_check_from_config(
                    spec.name,
                    result.level,
                    history,
                    &text,
                    detail,
                    self.requests.get(key),
                    key,
                    &self.chain.id,
                    &self.chain.variables,
                    &target,
                    &outcome,
                ))
            }
        }
    }

    fn render_unknown(
        &self,
        scope: Scope,
        result: &CheckResult,
        history: &[StatusLevel],
    ) -> CheckDescriptor {
        let header = if result.category.is_empty() {
            scope.label()
        } else {
            result.category.as_str()
        };
        let text = CheckText {
            header,
            prefix: &result.name,
            success: "passed",
            failure: "failed",
        };
        CheckDescriptor::Validation(build_check(
            &result.name,
            result.level,
            history,
            &text,
            result.detail.clone(),
        ))
    }
}

/// Overall level of a validation or node row against its window rows.
/// Shared by reports and the guild list.
fn overall_level<T>(
    current: StatusLevel,
    history: &[T],
    level: impl Fn(&T) -> StatusLevel,
) -> StatusLevel {
    let levels: Vec<StatusLevel> = history.iter().map(level).collect();
    combine_with_history(current, &levels)
}

/// Levels per check name across a set of stored rows.
fn history_by_name<'a>(
    rows: impl Iterator<Item = &'a [CheckResult]>,
) -> HashMap<String, Vec<StatusLevel>> {
    let mut history: HashMap<String, Vec<StatusLevel>> = HashMap::new();
    for checks in rows {
        for check in checks {
            history.entry(check.name.clone()).or_default().push(check.level);
        }
    }
    history
}

pub struct ValidationService {
    store: Arc<dyn ValidationStore>,
    producers: Arc<dyn ProducerSource>,
    renderer: CheckRenderer,
    settings: ValidationConfig,
    producer_limit: u32,
}

impl ValidationService {
    pub fn new(
        config: &Config,
        store: Arc<dyn ValidationStore>,
        producers: Arc<dyn ProducerSource>,
    ) -> Self {
        Self {
            store,
            producers,
            renderer: CheckRenderer::new(config),
            settings: config.validation.clone(),
            producer_limit: config.chain.producer_limit,
        }
    }

    /// Start of the history window ending at `date`. An oversized configured
    /// lookback covers all history.
    fn window_start(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        checked_window_start(date, self.settings.lookback_ms)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Report for one validation. `None` when the id is unknown.
    pub async fn check_bundle(
        &self,
        id: &str,
    ) -> Result<Option<GuildValidationReport>, ServiceError> {
        match self.store.validation_by_id(id).await? {
            Some(record) => Ok(Some(self.render_validation(record).await?)),
            None => {
                debug!(id, "validation not found");
                Ok(None)
            }
        }
    }

    /// Report for the most recent validation of `guild`.
    pub async fn latest_check_bundle(
        &self,
        guild: &str,
    ) -> Result<Option<GuildValidationReport>, ServiceError> {
        match self.store.last_validation_id(guild).await? {
            Some(id) => self.check_bundle(&id).await,
            None => {
                debug!(guild, "guild has no validations");
                Ok(None)
            }
        }
    }

    /// Endpoints of `node_type` seen within `lookback` (default from config).
    pub async fn endpoints(
        &self,
        node_type: NodeType,
        lookback_ms: Option<u64>,
        only_healthy: bool,
    ) -> Result<Vec<EndpointSummary>, ServiceError> {
        let lookback_ms = lookback_ms.unwrap_or(self.settings.endpoint_lookback_ms);
        let since = checked_window_start(Utc::now(), lookback_ms)
            .ok_or(ServiceError::InvalidLookback(lookback_ms))?;
        let rows = self.store.endpoint_validations_since(node_type, since).await?;
        Ok(summarize_endpoints(&rows, only_healthy))
    }

    /// Assemble every guild with its infrastructure summary and rank.
    pub async fn guild_list(&self) -> Result<GuildList, ServiceError> {
        let (guilds, ranks) = tokio::join!(
            self.store.guilds(),
            resolve_ranks(self.producers.as_ref(), self.producer_limit),
        );
        let guilds = guilds?;

        let mut records = Vec::with_capacity(guilds.len());
        for guild in guilds {
            records.push(self.guild_record(guild, &ranks).await?);
        }

        info!(
            guilds = records.len(),
            ranked = records.iter().filter(|g| g.rank.is_some()).count(),
            "guild list assembled"
        );
        Ok(GuildList::new(records))
    }

    async fn guild_record(
        &self,
        guild: GuildRow,
        ranks: &HashMap<String, u32>,
    ) -> Result<GuildRecord, ServiceError> {
        let last_validation_id = self.store.last_validation_id(&guild.name).await?;

        let infrastructure = match &last_validation_id {
            Some(id) => match self.store.validation_by_id(id).await? {
                Some(validation) => {
                    let history = self.guild_history(&validation).await?;
                    let organization = overall_level(validation.all_checks_ok, &history, |v| {
                        v.all_checks_ok
                    });
                    let mut node_levels = Vec::with_capacity(validation.nodes.len());
                    for node in &validation.nodes {
                        let history = self.node_history(node).await?;
                        node_levels.push((
                            node.node_type,
                            overall_level(node.all_checks_ok, &history, |n| n.all_checks_ok),
                        ));
                    }
                    guild_infrastructure(organization, &node_levels)
                }
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        Ok(GuildRecord {
            rank: ranks.get(&guild.name).copied(),
            name: guild.name,
            tracked_since: guild.tracked_since,
            location: guild.location,
            location_alpha: guild.location_alpha,
            url: guild.url,
            logo_url: guild.url_logo_256,
            infrastructure,
            last_validation_id,
        })
    }

    /// Validations of the same guild inside the lookback window, up to and
    /// including `validation` itself.
    async fn guild_history(
        &self,
        validation: &ValidationRecord,
    ) -> Result<Vec<ValidationRecord>, ServiceError> {
        let since = self.window_start(validation.validation_date);
        let mut rows = self
            .store
            .guild_validations_since(&validation.guild, since)
            .await?;
        rows.retain(|v| v.validation_date <= validation.validation_date);
        Ok(rows)
    }

    async fn render_validation(
        &self,
        record: ValidationRecord,
    ) -> Result<GuildValidationReport, ServiceError> {
        let history = self.guild_history(&record).await?;
        let guild = self.store.guild(&record.guild).await?;

        let check_history = history_by_name(history.iter().map(|v| v.checks.as_slice()));

        let organization_url = guild
            .as_ref()
            .and_then(|g| g.url.as_deref())
            .unwrap_or_default();
        let checks = self.renderer.render(
            Scope::Organization,
            &record.checks,
            &check_history,
            organization_url,
            true,
        );

        let mut nodes = Vec::with_capacity(NodeType::ALL.len());
        for node_type in NodeType::ALL {
            let mut reports = Vec::new();
            for node in record.nodes.iter().filter(|n| n.node_type == node_type) {
                reports.push(self.render_node(node).await?);
            }
            nodes.push(NodeGroup {
                node_type,
                nodes: reports,
            });
        }

        Ok(GuildValidationReport {
            overall_level: overall_level(record.all_checks_ok, &history, |v| v.all_checks_ok),
            id: record.id,
            guild: record.guild,
            validation_date: record.validation_date,
            guild_logo_url: guild.and_then(|g| g.url_logo_256),
            checks,
            nodes,
        })
    }

    /// Rows of the same endpoint inside the lookback window, up to and
    /// including `node` itself.
    async fn node_history(
        &self,
        node: &NodeValidationRecord,
    ) -> Result<Vec<NodeValidationRecord>, ServiceError> {
        let since = self.window_start(node.validation_date);
        let mut rows = self
            .store
            .node_validations_since(&node.guild, node.node_type, &node.endpoint_url, since)
            .await?;
        rows.retain(|n| n.validation_date <= node.validation_date);
        Ok(rows)
    }

    async fn render_node(&self, node: &NodeValidationRecord) -> Result<NodeReport, ServiceError> {
        let history = self.node_history(node).await?;
        let check_history = history_by_name(history.iter().map(|n| n.checks.as_slice()));

        let checks = self.renderer.render(
            Scope::Node(node.node_type),
            &node.checks,
            &check_history,
            &node.endpoint_url,
            node.is_ssl,
        );

        Ok(NodeReport {
            id: node.id.clone(),
            guild: node.guild.clone(),
            node_type: node.node_type,
            validation_date: node.validation_date,
            endpoint_url: node.endpoint_url.clone(),
            is_ssl: node.is_ssl,
            server_version: node.server_version.clone(),
            coordinates: coordinates(node),
            overall_level: overall_level(node.all_checks_ok, &history, |n| n.all_checks_ok),
            checks,
            statistics: self.node_statistics(node).await,
        })
    }

    /// Availability is supplementary: a failed read leaves it empty.
    async fn node_statistics(&self, node: &NodeValidationRecord) -> NodeStatistics {
        let since = Duration::try_days(self.settings.availability_days)
            .and_then(|span| Utc::now().checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        match self
            .store
            .node_validations_since(&node.guild, node.node_type, &node.endpoint_url, since)
            .await
        {
            Ok(rows) => NodeStatistics {
                availability: daily_availability(&rows),
            },
            Err(e) => {
                warn!(
                    guild = %node.guild,
                    endpoint = %node.endpoint_url,
                    error = %e,
                    "availability unavailable"
                );
                NodeStatistics::default()
            }
        }
    }
}

#[async_trait]
impl GuildListBuilder for ValidationService {
    async fn build_guild_list(&self) -> anyhow::Result<GuildList> {
        Ok(self.guild_list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ProducerVotes;
    use crate::domain::check::HttpMethod;
    use crate::store::{Snapshot, SnapshotStore};
    use chrono::TimeZone;
    use StatusLevel::*;

    struct Votes(Vec<(&'static str, f64)>);

    #[async_trait]
    impl ProducerSource for Votes {
        async fn producers(&self, _limit: u32) -> anyhow::Result<Vec<ProducerVotes>> {
            Ok(self
                .0
                .iter()
                .map(|(owner, total_votes)| ProducerVotes {
                    owner: owner.to_string(),
                    total_votes: *total_votes,
                })
                .collect())
        }
    }

    struct Down;

    #[async_trait]
    impl ProducerSource for Down {
        async fn producers(&self, _limit: u32) -> anyhow::Result<Vec<ProducerVotes>> {
            anyhow::bail!("timeout")
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn check(name: &str, level: StatusLevel) -> CheckResult {
        CheckResult {
            name: name.into(),
            level,
            category: String::new(),
            timestamp: None,
            duration_ms: None,
            http_code: None,
            error_kind: None,
            detail: None,
            value: None,
            url: None,
            path: None,
        }
    }

    fn api_node(id: &str, date: DateTime<Utc>, level: StatusLevel, checks: Vec<CheckResult>) -> NodeValidationRecord {
        NodeValidationRecord {
            id: id.into(),
            guild: "guildx".into(),
            node_type: NodeType::Api,
            validation_date: date,
            endpoint_url: "https://api.guildx.io".into(),
            is_ssl: false,
            server_version: Some("v5.0.0".into()),
            location_latitude: None,
            location_longitude: None,
            all_checks_ok: level,
            checks,
        }
    }

    fn validation(id: &str, date: DateTime<Utc>, level: StatusLevel, checks: Vec<CheckResult>, nodes: Vec<NodeValidationRecord>) -> ValidationRecord {
        ValidationRecord {
            id: id.into(),
            guild: "guildx".into(),
            validation_date: date,
            all_checks_ok: level,
            checks,
            nodes,
        }
    }

    fn guild(name: &str) -> GuildRow {
        GuildRow {
            name: name.into(),
            tracked_since: None,
            location: Some(756),
            location_alpha: Some("CHE".into()),
            url: Some(format!("https://{name}.io")),
            url_logo_256: Some(format!("https://{name}.io/logo.png")),
        }
    }

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.chain.variables.insert("CORE_SYMBOL".into(), "EOS".into());
        cfg.chain.variables.insert("BASIC_SYMBOL_ACCOUNT".into(), "eosio".into());
        cfg
    }

    fn service(snapshot: Snapshot, producers: Arc<dyn ProducerSource>) -> ValidationService {
        ValidationService::new(&config(), Arc::new(SnapshotStore::from_snapshot(snapshot)), producers)
    }

    fn five_checks_scenario() -> Snapshot {
        // One failure a minute before, four passes within the same batch.
        let mut validations = vec![validation(
            "old",
            at(-60),
            Error,
            vec![check("reg_location", Error)],
            Vec::new(),
        )];
        for i in 0..4 {
            validations.push(validation(
                &format!("v{i}"),
                at(i),
                Success,
                vec![check("reg_location", Success)],
                Vec::new(),
            ));
        }
        Snapshot {
            guilds: vec![guild("guildx")],
            validations,
        }
    }

    #[tokio::test]
    async fn lookback_excludes_older_failure() {
        let svc = service(five_checks_scenario(), Arc::new(Votes(Vec::new())));
        let report = svc.check_bundle("v3").await.unwrap().unwrap();
        assert_eq!(report.overall_level, SuccessAll);
        assert_eq!(report.checks[0].level(), SuccessAll);
        assert_eq!(report.guild_logo_url.as_deref(), Some("https://guildx.io/logo.png"));
    }

    #[tokio::test]
    async fn failure_inside_window_downgrades() {
        let mut snapshot = five_checks_scenario();
        snapshot.validations[0].validation_date = at(1);
        let svc = service(snapshot, Arc::new(Votes(Vec::new())));
        let report = svc.check_bundle("v3").await.unwrap().unwrap();
        assert_eq!(report.overall_level, Success);
    }

    #[tokio::test]
    async fn unknown_ids_are_absent() {
        let svc = service(five_checks_scenario(), Arc::new(Votes(Vec::new())));
        assert!(svc.check_bundle("nope").await.unwrap().is_none());
        assert!(svc.latest_check_bundle("nobody").await.unwrap().is_none());
        let latest = svc.latest_check_bundle("guildx").await.unwrap().unwrap();
        assert_eq!(latest.id, "v3");
    }

    #[tokio::test]
    async fn renders_node_checks_through_catalog() {
        let mut get_info = check("get_info", Error);
        get_info.duration_ms = Some(10_000);
        get_info.error_kind = Some("timeout".into());
        get_info.detail = Some("no response".into());

        let nodes = vec![api_node(
            "n1",
            at(0),
            Error,
            vec![
                check("ssl_ok", Success),
                get_info,
                check("basic_symbol", Success),
                check("custom_probe", Warn),
            ],
        )];
        let snapshot = Snapshot {
            guilds: vec![guild("guildx")],
            validations: vec![validation("v", at(0), Error, Vec::new(), nodes)],
        };
        let svc = service(snapshot, Arc::new(Votes(Vec::new())));
        let report = svc.check_bundle("v").await.unwrap().unwrap();

        assert_eq!(report.nodes.len(), NodeType::ALL.len());
        let api = report
            .nodes
            .iter()
            .find(|g| g.node_type == NodeType::Api)
            .unwrap();
        let node = &api.nodes[0];
        assert_eq!(node.overall_level, Error);

        let names: Vec<&str> = node.checks.iter().map(|c| c.name()).collect();
        // ssl_ok is skipped for a plain-HTTP endpoint.
        assert_eq!(names, vec!["get_info", "basic_symbol", "custom_probe"]);

        let CheckDescriptor::Request(get_info) = &node.checks[0] else {
            panic!("get_info should be a request check");
        };
        assert_eq!(get_info.url, "https://api.guildx.io/v1/chain/get_info");
        assert_eq!(get_info.error_message.as_deref(), Some("Timeout during request"));
        assert_eq!(get_info.detail.as_deref(), Some("no response"));

        let CheckDescriptor::Request(basic_symbol) = &node.checks[1] else {
            panic!("basic_symbol should be a request check");
        };
        assert_eq!(basic_symbol.method, HttpMethod::Post);
        assert!(basic_symbol.payload.as_deref().unwrap().contains(r#""symbol": "EOS""#));

        assert_eq!(node.checks[2].message(), "custom_probe failed");
    }

    #[tokio::test]
    async fn organization_fixed_requests_use_row_url() {
        let mut chains_json = check("chains_json", Success);
        chains_json.url = Some("https://guildx.io/about".into());
        let mut bpjson = check("bpjson_found", Success);
        bpjson.path = Some("/bp.eos.json".into());
        bpjson.value = Some("/bp.eos.json".into());

        let snapshot = Snapshot {
            guilds: vec![guild("guildx")],
            validations: vec![validation("v", at(0), Success, vec![chains_json, bpjson], Vec::new())],
        };
        let svc = service(snapshot, Arc::new(Votes(Vec::new())));
        let report = svc.check_bundle("v").await.unwrap().unwrap();

        let CheckDescriptor::Request(chains) = &report.checks[0] else {
            panic!("chains_json should be a request check");
        };
        assert_eq!(chains.url, "https://guildx.io/about/chains.json");

        let CheckDescriptor::Request(bp) = &report.checks[1] else {
            panic!("bpjson_found should be a request check");
        };
        assert_eq!(bp.url, "https://guildx.io/bp.eos.json");
        assert_eq!(bp.message, "Bp.json found at /bp.eos.json");
    }

    #[tokio::test]
    async fn disabled_checks_are_hidden() {
        let mut cfg = config();
        cfg.chain.disabled_checks.push("organization.reg_location".into());
        let svc = ValidationService::new(
            &cfg,
            Arc::new(SnapshotStore::from_snapshot(five_checks_scenario())),
            Arc::new(Votes(Vec::new())),
        );
        let report = svc.check_bundle("v3").await.unwrap().unwrap();
        assert!(report.checks.is_empty());
    }

    #[tokio::test]
    async fn guild_list_merges_ranks() {
        let mut snapshot = five_checks_scenario();
        snapshot.guilds.push(guild("unranked"));
        snapshot.validations[4]
            .nodes
            .push(api_node("n", at(3), Success, Vec::new()));

        let svc = service(snapshot, Arc::new(Votes(vec![("other", 50.0), ("guildx", 10.0)])));
        let list = svc.guild_list().await.unwrap();
        assert_eq!(list.guilds.len(), 2);

        let guildx = &list.guilds[0];
        assert_eq!(guildx.rank, Some(2));
        assert_eq!(guildx.last_validation_id.as_deref(), Some("v3"));
        assert_eq!(guildx.infrastructure[0].level, SuccessAll);
        assert_eq!(guildx.infrastructure[2].category, "api");
        assert_eq!(guildx.infrastructure[2].level, SuccessAll);

        let unranked = &list.guilds[1];
        assert_eq!(unranked.rank, None);
        assert!(unranked.infrastructure.is_empty());
    }

    #[tokio::test]
    async fn guild_list_survives_rank_failure() {
        let svc = service(five_checks_scenario(), Arc::new(Down));
        let list = svc.guild_list().await.unwrap();
        assert_eq!(list.guilds.len(), 1);
        assert_eq!(list.guilds[0].rank, None);
    }

    #[tokio::test]
    async fn guild_list_matches_node_reports() {
        // A stored SUCCESS_ALL is not a valid current level and reads as Error.
        let nodes = vec![api_node("n", at(0), SuccessAll, Vec::new())];
        let snapshot = Snapshot {
            guilds: vec![guild("guildx")],
            validations: vec![validation("v", at(0), Success, Vec::new(), nodes)],
        };
        let svc = service(snapshot, Arc::new(Votes(Vec::new())));

        let report = svc.check_bundle("v").await.unwrap().unwrap();
        let api = report
            .nodes
            .iter()
            .find(|g| g.node_type == NodeType::Api)
            .unwrap();
        assert_eq!(api.nodes[0].overall_level, Error);

        let list = svc.guild_list().await.unwrap();
        let category = list.guilds[0]
            .infrastructure
            .iter()
            .find(|c| c.category == "api")
            .unwrap();
        assert_eq!(category.level, api.nodes[0].overall_level);
        assert_eq!(list.guilds[0].infrastructure[0].level, report.overall_level);
    }

    #[tokio::test]
    async fn endpoints_within_window() {
        let now = Utc::now();
        let mut recent = api_node("n1", now - Duration::seconds(5), Success, Vec::new());
        recent.endpoint_url = "https://recent.guildx.io".into();
        let stale = api_node("n2", now - Duration::hours(3), Success, Vec::new());
        let snapshot = Snapshot {
            guilds: vec![guild("guildx")],
            validations: vec![validation("v", now, Success, Vec::new(), vec![recent, stale])],
        };
        let svc = service(snapshot, Arc::new(Votes(Vec::new())));

        let listed = svc.endpoints(NodeType::Api, None, true).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].endpoint_url, "https://recent.guildx.io");

        let wide = svc.endpoints(NodeType::Api, Some(86_400_000), false).await.unwrap();
        assert_eq!(wide.len(), 2);
    }

    #[tokio::test]
    async fn oversized_lookback_is_rejected() {
        let svc = service(five_checks_scenario(), Arc::new(Votes(Vec::new())));
        for lookback in [9_000_000_000_000_000, u64::MAX] {
            let err = svc
                .endpoints(NodeType::Api, Some(lookback), false)
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidLookback(ms) if ms == lookback));
        }
    }

    #[tokio::test]
    async fn oversized_configured_lookback_covers_all_history() {
        let mut cfg = config();
        cfg.validation.lookback_ms = u64::MAX;
        let svc = ValidationService::new(
            &cfg,
            Arc::new(SnapshotStore::from_snapshot(five_checks_scenario())),
            Arc::new(Votes(Vec::new())),
        );
        let report = svc.check_bundle("v3").await.unwrap().unwrap();
        assert_eq!(report.overall_level, Success);
    }
}
