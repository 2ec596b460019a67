//! `guildwatch query` — query a guildwatch daemon via its REST API.

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use crate::client::GuildwatchClient;
use crate::config;
use crate::domain::report::NodeType;

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Daemon health check
    Health,
    /// Cached guild list with infrastructure summary and rank
    Guilds,
    /// Rebuild the guild list now
    RefreshGuilds,
    /// One validation pass by id
    Validation {
        id: String,
    },
    /// Latest validation pass of a guild
    Latest {
        guild: String,
    },
    /// Endpoints of a node type seen recently
    Endpoints {
        /// seed, api, wallet, history, indexer or asset-index
        node_type: NodeType,

        /// Window in milliseconds (daemon default when omitted)
        #[arg(long)]
        lookback_ms: Option<u64>,

        /// Include endpoints that failed within the window
        #[arg(long)]
        all: bool,
    },
}

pub fn run(
    remote: Option<&str>,
    format: &str,
    config_path: Option<&Path>,
    command: &QueryCommands,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(remote, format, config_path, command))
}

async fn run_async(
    remote: Option<&str>,
    format: &str,
    config_path: Option<&Path>,
    command: &QueryCommands,
) -> Result<()> {
    let cfg = config::load(config_path)?;
    let client = GuildwatchClient::from_remote(remote, &cfg.remotes)?;

    match command {
        QueryCommands::Health => {
            let data = client.health().await?;
            print_output(format, &data)
        }
        QueryCommands::Guilds => {
            let data = client.guilds().await?;
            print_output(format, &data)
        }
        QueryCommands::RefreshGuilds => {
            let data = client.refresh_guilds().await?;
            print_output(format, &data)
        }
        QueryCommands::Validation { id } => {
            let data = client.validation(id).await?;
            print_output(format, &data)
        }
        QueryCommands::Latest { guild } => {
            let data = client.latest_validation(guild).await?;
            print_output(format, &data)
        }
        QueryCommands::Endpoints {
            node_type,
            lookback_ms,
            all,
        } => {
            let data = client.endpoints(*node_type, *lookback_ms, !all).await?;
            print_output(format, &data)
        }
    }
}

fn print_output<T: serde::Serialize>(format: &str, data: &T) -> Result<()> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{}", json);
        }
        _ => {
            // Table format: recursive key-value from serde_json::Value
            let value = serde_json::to_value(data)?;
            print_value(&value, 0);
        }
    }
    Ok(())
}

fn print_value(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                match val {
                    serde_json::Value::Object(_) => {
                        println!("{}{}:", pad, key);
                        print_value(val, indent + 1);
                    }
                    serde_json::Value::Array(arr) => {
                        if arr.is_empty() {
                            println!("{}{}: []", pad, key);
                        } else if arr.iter().all(|v| !v.is_object() && !v.is_array()) {
                            // Simple array: print inline
                            let items: Vec<String> =
                                arr.iter().map(|v| format_scalar(v)).collect();
                            println!("{}{}: {}", pad, key, items.join(", "));
                        } else {
                            println!("{}{}:", pad, key);
                            for (i, item) in arr.iter().enumerate() {
                                if item.is_object() {
                                    println!("{}  [{}]:", pad, i);
                                    print_value(item, indent + 2);
                                } else {
                                    println!("{}  - {}", pad, format_scalar(item));
                                }
                            }
                        }
                    }
                    _ => {
                        println!("{}{}: {}", pad, key, format_scalar(val));
                    }
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                if item.is_object() {
                    println!("{}[{}]:", pad, i);
                    print_value(item, indent + 1);
                } else {
                    println!("{}- {}", pad, format_scalar(item));
                }
            }
        }
        _ => {
            println!("{}{}", pad, format_scalar(value));
        }
    }
}

fn format_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
