//! `guildwatch report` — render a guild's validation straight from the store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use colored::{ColoredString, Colorize};

use crate::chain::ChainRpcClient;
use crate::config;
use crate::domain::check::CheckDescriptor;
use crate::domain::report::GuildValidationReport;
use crate::domain::status::StatusLevel;
use crate::domain::validation_service::ValidationService;
use crate::store::SnapshotStore;

pub fn run(guild: &str, id: Option<&str>, format: &str, config_path: Option<&Path>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(guild, id, format, config_path))
}

async fn run_async(
    guild: &str,
    id: Option<&str>,
    format: &str,
    config_path: Option<&Path>,
) -> Result<()> {
    let cfg = config::load(config_path)?;
    let store = Arc::new(SnapshotStore::open(PathBuf::from(&cfg.store.snapshot_file)));
    let producers = Arc::new(ChainRpcClient::new(
        &cfg.chain.api_endpoint,
        Duration::from_millis(cfg.validation.request_timeout_ms),
    )?);
    let svc = ValidationService::new(&cfg, store, producers);

    let report = match id {
        Some(id) => svc.check_bundle(id).await?,
        None => svc.latest_check_bundle(guild).await?,
    };
    let Some(report) = report else {
        bail!("no validation found for guild '{}'", guild);
    };
    if report.guild != guild {
        bail!("validation '{}' belongs to guild '{}'", report.id, report.guild);
    }

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        _ => print_table(&report),
    }
    Ok(())
}

fn paint(level: StatusLevel) -> ColoredString {
    let label = level.label();
    match level {
        StatusLevel::SuccessAll => label.green().bold(),
        StatusLevel::Success => label.green(),
        StatusLevel::Info => label.blue(),
        StatusLevel::Warn => label.yellow(),
        StatusLevel::Error => label.red().bold(),
    }
}

fn print_checks(checks: &[CheckDescriptor], indent: &str) {
    for check in checks {
        println!(
            "{}{:<12} {} {}",
            indent,
            paint(check.level()),
            check.message(),
            format!("[{}]", check.name()).dimmed()
        );
        if let Some(detail) = check.detail() {
            println!("{}{:<12} {}", indent, "", detail.dimmed());
        }
        if let CheckDescriptor::Request(req) = check {
            println!("{}{:<12} {} {}", indent, "", format!("{:?}", req.method).dimmed(), req.url.dimmed());
        }
    }
}

fn print_table(report: &GuildValidationReport) {
    println!("{}", format!("═══ {} ═══", report.guild).cyan().bold());
    println!("  Validation:  {}", report.id);
    println!("  Date:        {}", report.validation_date.to_rfc3339());
    println!("  Overall:     {}", paint(report.overall_level));

    if !report.checks.is_empty() {
        println!();
        println!("{}", "── Organization ──".yellow());
        print_checks(&report.checks, "  ");
    }

    for group in report.nodes.iter().filter(|g| !g.nodes.is_empty()) {
        println!();
        println!("{}", format!("── {} ──", group.node_type).yellow());
        for node in &group.nodes {
            println!("  {}  {}", node.endpoint_url.bold(), paint(node.overall_level));
            if let Some(version) = &node.server_version {
                println!("    {} {}", "Version:".dimmed(), version);
            }
            if let Some(latest) = node.statistics.availability.last() {
                println!("    {} {}% on {}", "Availability:".dimmed(), latest.availability, latest.date);
            }
            print_checks(&node.checks, "    ");
        }
    }
}
