use anyhow::Result;
use clap::{Parser, Subcommand};

use aidash::cli;

#[derive(Debug, Parser)]
#[command(name = "aidash")]
#[command(about = "Dashboard for AI model configurations, chat and prediction history")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web dashboard
    Serve {
        /// Address to listen on (default: web.addr, 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Use the in-memory store with demo data instead of the remote one
        #[arg(long)]
        local: bool,
        /// Don't open the dashboard in a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Check config, record store, auth and completion endpoints
    Health,
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective (merged) configuration
    Show,
    /// Write a default config file to ~/.aidash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `completion.base_url http://localhost:5000`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve {
            addr,
            local,
            no_browser,
        } => cli::run_serve(addr, local, no_browser),
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
