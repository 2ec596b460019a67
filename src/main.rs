mod api;
mod chain;
mod client;
mod commands;
mod config;
mod domain;
mod server;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "guildwatch",
    version,
    about = "Status reporting for guild-operated blockchain infrastructure"
)]
struct Cli {
    /// Path to config file (default: ~/.config/guildwatch/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the guildwatch daemon (REST + GraphQL)
    Daemon {
        /// HTTP listen address (overrides config)
        #[arg(long)]
        http_addr: Option<String>,

        /// Log level (overrides config)
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Render a guild's validation from the configured store (no daemon needed)
    Report {
        /// Guild name
        guild: String,

        /// Specific validation id instead of the latest
        #[arg(long)]
        id: Option<String>,

        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Query a guildwatch daemon's REST API
    Query {
        /// Target daemon (from config remotes map; defaults to localhost)
        #[arg(long, global = true)]
        remote: Option<String>,

        /// Output format (table or json)
        #[arg(long, global = true, default_value = "table")]
        format: String,

        #[command(subcommand)]
        command: commands::query::QueryCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Daemon {
            http_addr,
            log_level,
        } => commands::daemon::run(http_addr, log_level, config),
        Commands::Report { guild, id, format } => {
            commands::report::run(&guild, id.as_deref(), &format, config)
        }
        Commands::Query {
            remote,
            format,
            command,
        } => commands::query::run(remote.as_deref(), &format, config, &command),
    }
}
