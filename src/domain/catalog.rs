//! Check catalog — how each stored check is worded and which request it made.
//!
//! Each scope (the organization itself, and every node type) has a table of
//! [`CheckSpec`]s. Rendering walks the table in order, so the table also fixes
//! the order checks appear in a report.

use super::report::NodeType;

/// Where a request check's URL comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    /// Plain check, no request.
    None,
    /// `GET` against the check's base URL; `path` defaults to `/`.
    Fixed { path: Option<&'static str> },
    /// Path, payload and method from the request template table.
    Configured { key: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct CheckSpec {
    pub name: &'static str,
    pub header: &'static str,
    pub prefix: &'static str,
    /// Outcome wording; `{value}` is replaced by the stored value.
    pub success: &'static str,
    pub failure: &'static str,
    pub request: RequestSource,
    /// Only rendered for TLS endpoints.
    pub ssl_only: bool,
}

/// What a set of checks describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Organization,
    Node(NodeType),
}

impl Scope {
    pub fn label(self) -> &'static str {
        match self {
            Scope::Organization => "organization",
            Scope::Node(node_type) => node_type.category(),
        }
    }
}

const fn plain(
    name: &'static str,
    header: &'static str,
    prefix: &'static str,
    success: &'static str,
    failure: &'static str,
) -> CheckSpec {
    CheckSpec {
        name,
        header,
        prefix,
        success,
        failure,
        request: RequestSource::None,
        ssl_only: false,
    }
}

const fn fixed(
    name: &'static str,
    header: &'static str,
    prefix: &'static str,
    success: &'static str,
    failure: &'static str,
    path: Option<&'static str>,
) -> CheckSpec {
    CheckSpec {
        request: RequestSource::Fixed { path },
        ..plain(name, header, prefix, success, failure)
    }
}

const fn configured(
    name: &'static str,
    header: &'static str,
    prefix: &'static str,
    success: &'static str,
    failure: &'static str,
    key: &'static str,
) -> CheckSpec {
    CheckSpec {
        request: RequestSource::Configured { key },
        ..plain(name, header, prefix, success, failure)
    }
}

const LOCATION: CheckSpec = plain("location_ok", "general", "Provided location in bp.json is", "valid", "invalid");
const ENDPOINT_URL: CheckSpec = plain("endpoint_url_ok", "general", "Provided endpoint url is", "valid", "invalid");
const TLS: CheckSpec = CheckSpec {
    ssl_only: true,
    ..plain("ssl_ok", "general", "TLS test", "passed", "not passed")
};

static ORGANIZATION: &[CheckSpec] = &[
    plain("reg_location", "regproducer", "Location ({value}) on Chain is", "valid", "invalid"),
    fixed("reg_website", "regproducer", "Website registered on Chain is", "reachable", "was not provided or not reachable", None),
    fixed("chains_json", "chains.json", "Chains.json", "with valid json formatting was found", "is not valid (not provided, reachable or invalid json formatting)", Some("/chains.json")),
    plain("chains_json_access_control_header", "chains.json", "Chains.json Access-control-allow-origin header", "configured properly", "not configured properly"),
    fixed("bpjson_found", "bp.json", "Bp.json", "found at {value}", "not found or not reachable", Some("/bp.json")),
    plain("bpjson_producer_account_name", "bp.json", "Producer account name", "is valid", "is not valid"),
    plain("bpjson_candidate_name", "bp.json", "Candidate name", "is valid", "is not valid"),
    fixed("bpjson_website", "bp.json", "Website", "is reachable", "is not valid", None),
    fixed("bpjson_code_of_conduct", "bp.json", "Code of conduct", "is reachable", "is not valid", None),
    fixed("bpjson_ownership_disclosure", "bp.json", "Ownership Disclosure", "is reachable", "is not valid", None),
    plain("bpjson_email", "bp.json", "Email", "is valid", "is not valid"),
    plain("bpjson_github_user", "bp.json", "GitHub user", "was provided", "is not valid"),
    plain("bpjson_chain_resources", "bp.json", "Chain resources", "are valid", "are not valid"),
    plain("bpjson_other_resources", "bp.json", "Other resources", "are valid", "are not valid"),
    plain("bpjson_branding", "bp.json", "Branding", "is provided in all three formats", "is not valid"),
    plain("bpjson_location", "bp.json", "Location of the organization", "is valid", "is invalid"),
    plain("bpjson_social", "bp.json", "Social Services", "are valid", "are either not provided (min. 4 required) or some are invalid (no urls or @ before username allowed)"),
    plain("nodes_producer", "bp.json", "", "At least one producer node with valid location was found", "No producer node with valid location was found"),
];

static SEED: &[CheckSpec] = &[
    LOCATION,
    plain("endpoint_url_ok", "general", "Provided P2P address is", "valid", "invalid"),
    plain("p2p_connection_possible", "validation", "P2P connection was", "possible", "not possible"),
    plain("block_transmission_speed", "validation", "Block transmission speed is", "OK ({value} blocks / s)", "too slow ({value} blocks / s)"),
];

static API: &[CheckSpec] = &[
    LOCATION,
    ENDPOINT_URL,
    TLS,
    configured("get_info", "get_info", "Get_info request", "was successful", "was not successful", "api.get_info"),
    plain("server_version_ok", "get_info", "Server version", "({value}) is valid", "is invalid"),
    plain("correct_chain", "get_info", "Node is provided for the", "correct chain", "wrong chain"),
    plain("head_block_delta", "get_info", "Head block", "is up-to-date", "is not up-to-date"),
    configured("block_one", "validation", "Block one test", "passed", "not passed", "api.block_one"),
    configured("verbose_error", "validation", "Error test", "passed", "not passed", "api.verbose_error"),
    configured("abi_serializer", "validation", "Abi serializer test", "passed", "not passed", "api.abi_serializer"),
    configured("basic_symbol", "validation", "Basic symbol test", "passed", "not passed", "api.basic_symbol"),
    configured("producer_api", "validation", "Producer api", "is not accessible", "is accessible", "api.producer_api"),
    configured("db_size_api", "validation", "Db_size api", "is not accessible", "is accessible", "api.db_size_api"),
    configured("net_api", "validation", "Net api", "is not accessible", "is accessible", "api.net_api"),
];

static WALLET: &[CheckSpec] = &[
    LOCATION,
    ENDPOINT_URL,
    TLS,
    configured("get_accounts", "validation", "get_accounts by name test", "passed", "not passed", "wallet.accounts"),
    configured("get_accounts_by_key", "validation", "get_accounts by key test", "passed", "not passed", "wallet.keys"),
];

static HISTORY: &[CheckSpec] = &[
    LOCATION,
    ENDPOINT_URL,
    TLS,
    configured("get_transaction", "validation", "get_transaction test", "passed", "not passed", "history.get_transaction"),
    configured("get_actions", "validation", "get_actions test", "passed", "not passed", "history.get_actions"),
    configured("get_key_accounts", "validation", "get_key_accounts test", "passed", "not passed", "history.get_key_accounts"),
    configured("get_controlled_accounts", "validation", "get_controlled_accounts test", "passed", "not passed", "history.get_controlled_accounts"),
];

static INDEXER: &[CheckSpec] = &[
    LOCATION,
    ENDPOINT_URL,
    TLS,
    configured("health", "health", "Hyperion Health", "was found", "was not found", "indexer.health"),
    plain("health_version", "health", "Hyperion version", "is valid", "is invalid"),
    plain("health_host", "health", "Hyperion Host", "was provided", "was not provided"),
    plain("health_query_time", "health", "Hyperion query time", "is OK", "is not OK"),
    plain("health_all_features", "health", "Hyperion features are", "OK", "not OK"),
    plain("health_elastic", "health", "Hyperion Elastic status is", "OK", "not OK"),
    plain("health_rabbitmq", "health", "Hyperion RabbitMq status is", "OK", "not OK"),
    plain("health_nodeosrpc", "health", "Hyperion NodeosRpc status is", "OK", "not OK"),
    plain("health_total_indexed_blocks", "health", "Hyperion", "total indexed block == last indexed block", "total indexed block != last indexed block"),
    configured("get_transaction", "validation", "get_transaction test", "passed", "not passed", "indexer.get_transaction"),
    configured("get_actions", "validation", "get_actions test", "passed", "not passed", "indexer.get_actions"),
    configured("key_accounts", "validation", "get_key_accounts test", "passed", "not passed", "indexer.get_key_accounts"),
    configured("created_accounts", "validation", "get_created_accounts test", "passed", "not passed", "indexer.get_created_accounts"),
];

static ASSET_INDEX: &[CheckSpec] = &[
    LOCATION,
    ENDPOINT_URL,
    TLS,
    configured("health_found", "health", "Atomic health is", "reachable", "not reachable", "asset_index.health"),
    plain("access_control_header", "health", "Access-Control-Allow-Headers configured", "properly", "not properly"),
    plain("health_postgres", "health", "Atomic Postgres status is", "OK", "not OK"),
    plain("health_redis", "health", "Atomic Redis status is", "OK", "not OK"),
    plain("health_chain", "health", "Atomic provided for", "correct chain", "wrong chain"),
    plain("health_total_indexed_blocks", "health", "Atomic", "total indexed block == last indexed block", "total indexed block != last indexed block"),
    configured("assets", "validation", "Atomicassets assets test", "passed", "not passed", "asset_index.assets"),
    configured("collections", "validation", "Atomicassets collections test", "passed", "not passed", "asset_index.collections"),
    configured("schemas", "validation", "Atomicassets schemas test", "passed", "not passed", "asset_index.schemas"),
    configured("templates", "validation", "Atomicassets templates test", "passed", "not passed", "asset_index.templates"),
];

pub fn checks_for(scope: Scope) -> &'static [CheckSpec] {
    match scope {
        Scope::Organization => ORGANIZATION,
        Scope::Node(NodeType::Seed) => SEED,
        Scope::Node(NodeType::Api) => API,
        Scope::Node(NodeType::Wallet) => WALLET,
        Scope::Node(NodeType::History) => HISTORY,
        Scope::Node(NodeType::Indexer) => INDEXER,
        Scope::Node(NodeType::AssetIndex) => ASSET_INDEX,
    }
}

/// Fill `{value}` in outcome wording. A missing value reads as `unknown`.
pub fn interpolate(wording: &str, value: Option<&str>) -> String {
    if wording.contains("{value}") {
        wording.replace("{value}", value.unwrap_or("unknown"))
    } else {
        wording.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_per_scope() {
        let scopes = std::iter::once(Scope::Organization)
            .chain(NodeType::ALL.iter().map(|t| Scope::Node(*t)));
        for scope in scopes {
            let mut seen = HashSet::new();
            for spec in checks_for(scope) {
                assert!(seen.insert(spec.name), "duplicate {} in {}", spec.name, scope.label());
            }
        }
    }

    #[test]
    fn configured_keys_are_scoped() {
        for node_type in NodeType::ALL {
            for spec in checks_for(Scope::Node(node_type)) {
                if let RequestSource::Configured { key } = spec.request {
                    let prefix = node_type.category().replace('-', "_");
                    assert!(key.starts_with(&format!("{}.", prefix)), "{key}");
                }
            }
        }
    }

    #[test]
    fn interpolates_value() {
        assert_eq!(interpolate("OK ({value} blocks / s)", Some("12")), "OK (12 blocks / s)");
        assert_eq!(interpolate("found at {value}", None), "found at unknown");
        assert_eq!(interpolate("passed", Some("x")), "passed");
    }
}
