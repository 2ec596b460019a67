//! Check descriptors — the presentable form of a single stored check result.
//!
//! Plain checks carry a level and a message. Request checks additionally
//! describe the HTTP request the validation process issued, so a guild can
//! reproduce it.

use std::collections::BTreeMap;

use async_graphql::{Enum, SimpleObject, Union};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::RequestTemplate;

use super::status::{combine_with_history, StatusLevel};
use super::template::substitute;
use super::url::combine_url_with_path;

/// Transport failure reported by the validation process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum HttpErrorKind {
    Ssl,
    Timeout,
    Dns,
    Http,
    InvalidUrl,
    Other,
    Unknown,
}

impl HttpErrorKind {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "ssl" | "tls" => Some(Self::Ssl),
            "timeout" => Some(Self::Timeout),
            "dns" => Some(Self::Dns),
            "http" => Some(Self::Http),
            "invalidurl" => Some(Self::InvalidUrl),
            "other" => Some(Self::Other),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Ssl => "Invalid SSL certificate",
            Self::Timeout => "Timeout during request",
            Self::Dns => "DNS Error: Host could not be resolved",
            Self::Http => "Http Error during request",
            Self::InvalidUrl => "Invalid URL",
            Self::Other => "ECONNREFUSED, EPROTO, ECONNRESET or another error occurred",
            Self::Unknown => "An unknown error occurred",
        }
    }
}

/// Human-readable phrase for a raw transport failure kind.
pub fn decode_error_kind(raw: Option<&str>) -> Option<&'static str> {
    raw.and_then(HttpErrorKind::parse).map(HttpErrorKind::message)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct ValidationCheck {
    pub name: String,
    pub level: StatusLevel,
    pub header: String,
    pub message: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct RequestCheck {
    pub name: String,
    pub level: StatusLevel,
    pub header: String,
    pub message: String,
    pub detail: Option<String>,
    pub url: String,
    pub payload: Option<String>,
    pub method: HttpMethod,
    pub timeout_ms: u64,
    pub duration_ms: Option<i64>,
    pub http_code: Option<i32>,
    pub error_kind: Option<HttpErrorKind>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Union)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckDescriptor {
    Validation(ValidationCheck),
    Request(RequestCheck),
}

impl CheckDescriptor {
    pub fn name(&self) -> &str {
        match self {
            Self::Validation(c) => &c.name,
            Self::Request(c) => &c.name,
        }
    }

    pub fn level(&self) -> StatusLevel {
        match self {
            Self::Validation(c) => c.level,
            Self::Request(c) => c.level,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(c) => &c.message,
            Self::Request(c) => &c.message,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Validation(c) => c.detail.as_deref(),
            Self::Request(c) => c.detail.as_deref(),
        }
    }
}

/// Wording of a check: header, message prefix and the two outcomes.
#[derive(Debug, Clone, Copy)]
pub struct CheckText<'a> {
    pub header: &'a str,
    pub prefix: &'a str,
    pub success: &'a str,
    pub failure: &'a str,
}

/// How the validation process's request went.
#[derive(Debug, Clone, Default)]
pub struct RequestOutcome {
    pub duration_ms: Option<i64>,
    pub http_code: Option<i32>,
    pub error_kind: Option<String>,
}

/// Where the request went and under which limits.
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'a> {
    pub endpoint_url: &'a str,
    pub timeout_ms: u64,
}

pub fn build_check(
    name: &str,
    current: StatusLevel,
    history: &[StatusLevel],
    text: &CheckText<'_>,
    detail: Option<String>,
) -> ValidationCheck {
    let level = combine_with_history(current, history);
    let outcome = if level.is_passing() {
        text.success
    } else {
        text.failure
    };
    let message = if text.prefix.is_empty() {
        outcome.to_string()
    } else {
        format!("{} {}", text.prefix, outcome)
    };

    ValidationCheck {
        name: name.to_string(),
        level,
        header: text.header.to_string(),
        message,
        detail: if level.is_passing() { None } else { detail },
    }
}

fn into_request(
    base: ValidationCheck,
    url: String,
    payload: Option<String>,
    method: HttpMethod,
    target: &RequestTarget<'_>,
    outcome: &RequestOutcome,
) -> RequestCheck {
    RequestCheck {
        name: base.name,
        level: base.level,
        header: base.header,
        message: base.message,
        detail: base.detail,
        url,
        payload,
        method,
        timeout_ms: target.timeout_ms,
        duration_ms: outcome.duration_ms,
        http_code: outcome.http_code,
        error_kind: outcome.error_kind.as_deref().and_then(HttpErrorKind::parse),
        error_message: decode_error_kind(outcome.error_kind.as_deref()).map(str::to_string),
    }
}

/// Request check with a fixed `GET` to `path` (default `/`).
#[allow(clippy::too_many_arguments)]
pub fn build_request_check(
    name: &str,
    current: StatusLevel,
    history: &[StatusLevel],
    text: &CheckText<'_>,
    detail: Option<String>,
    target: &RequestTarget<'_>,
    path: Option<&str>,
    outcome: &RequestOutcome,
) -> RequestCheck {
    let base = build_check(name, current, history, text, detail);
    let url = combine_url_with_path(target.endpoint_url, path.unwrap_or("/"));
    into_request(base, url, None, HttpMethod::Get, target, outcome)
}

/// Request check whose path, payload and method come from the request
/// template table, with chain variables substituted in.
///
/// Template problems never fail the check: they are logged and whatever text
/// could be resolved is used.
#[allow(clippy::too_many_arguments)]
pub fn build_request_check_from_config(
    name: &str,
    current: StatusLevel,
    history: &[StatusLevel],
    text: &CheckText<'_>,
    detail: Option<String>,
    template: Option<&RequestTemplate>,
    config_key: &str,
    chain_id: &str,
    variables: &BTreeMap<String, String>,
    target: &RequestTarget<'_>,
    outcome: &RequestOutcome,
) -> RequestCheck {
    let base = build_check(name, current, history, text, detail);

    let Some(template) = template else {
        error!(
            check = name,
            config_key,
            chain_id,
            "no request template configured, reporting bare endpoint"
        );
        let url = combine_url_with_path(target.endpoint_url, "");
        return into_request(base, url, None, HttpMethod::Get, target, outcome);
    };

    let path = substitute(&template.path, &template.variables, variables);
    for e in &path.errors {
        warn!(check = name, config_key, chain_id, error = %e, template = %template.path, "path template not fully resolved");
    }

    let payload = template.payload.as_deref().map(|raw| {
        let resolved = substitute(raw, &template.variables, variables);
        for e in &resolved.errors {
            warn!(check = name, config_key, chain_id, error = %e, "payload template not fully resolved");
        }
        resolved.text
    });

    let url = combine_url_with_path(target.endpoint_url, &path.text);
    into_request(base, url, payload, template.method, target, outcome)
}
