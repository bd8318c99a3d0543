//! CLI command implementations for aidash.
//!
//! Provides subcommand handlers for:
//! - `aidash serve`: run the web dashboard
//! - `aidash health`: check config, store, auth and completion endpoints
//! - `aidash config show|init|set|reset`: configuration management

use std::rc::Rc;

use anyhow::Result;
use colored::Colorize;

use crate::activity;
use crate::auth::{AuthClient, Backend};
use crate::completion::{CompletionClient, HttpCompletionClient};
use crate::config;
use crate::config::schema::StoreBackend;
use crate::web::DashboardServer;

// ---------------------------------------------------------------------------
// aidash serve
// ---------------------------------------------------------------------------

/// Start the dashboard server. Blocks until the process is stopped.
pub fn run_serve(addr: Option<String>, local: bool, no_browser: bool) -> Result<()> {
    let mut cfg = config::load();
    if local {
        cfg.store.backend = StoreBackend::Local;
    }
    activity::init(cfg.logging.enabled);

    let backend = Backend::from_config(&cfg)?;
    let completion: Rc<dyn CompletionClient> =
        Rc::new(HttpCompletionClient::from_config(&cfg.completion));

    let addr = addr.unwrap_or_else(|| cfg.web.addr.clone());
    let open = cfg.web.open_browser && !no_browser;

    if matches!(backend, Backend::Local { .. }) {
        println!(
            "{}",
            "Local store: rows live in memory and are lost on exit.".yellow()
        );
    }

    DashboardServer::new(backend, completion, cfg).serve(&addr, open)
}

// ---------------------------------------------------------------------------
// aidash health
// ---------------------------------------------------------------------------

/// Check config files, the record store, auth and the completion service.
pub fn run_health() -> Result<()> {
    println!("{}", "aidash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    // Config files
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.aidash/config.toml found"
        } else {
            "not found (run `aidash config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".aidash.toml found"
        } else {
            "none (optional)"
        },
    );

    // Record store + auth
    match cfg.store.backend {
        StoreBackend::Local => {
            print_health_item("Store", true, "local (in-memory, demo data)");
        }
        StoreBackend::Remote => {
            let configured = cfg.store.is_remote_configured();
            print_health_item(
                "Store",
                configured,
                &if configured {
                    format!("remote at {}", cfg.store.url)
                } else {
                    "not configured (set SUPABASE_URL and SUPABASE_ANON_KEY)".to_string()
                },
            );
            if configured {
                let auth_ok = AuthClient::from_config(&cfg.store).is_healthy();
                print_health_item(
                    "Auth",
                    auth_ok,
                    if auth_ok { "reachable" } else { "not reachable" },
                );
            }
        }
    }

    // Completion endpoint
    let completion = HttpCompletionClient::from_config(&cfg.completion);
    let completion_ok = completion.is_healthy();
    let completion_detail = if completion_ok {
        format!("reachable at {}", completion.base_url())
    } else {
        format!(
            "not reachable at {} (is the chat backend running?)",
            completion.base_url()
        )
    };
    print_health_item("Completion", completion_ok, &completion_detail);

    // Activity log
    print_health_item(
        "Activity logging",
        cfg.logging.enabled,
        if cfg.logging.enabled {
            "enabled"
        } else {
            "disabled (logging.enabled = false)"
        },
    );
    let log_exists = activity::activity_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    if log_exists {
        let summary = activity::summarize(&activity::read_all_entries());
        print_health_item(
            "Activity log",
            summary.failures == 0,
            &format!(
                "{} entries, {} failures, {:.0}ms avg latency",
                summary.entries, summary.failures, summary.avg_latency_ms
            ),
        );
    } else {
        print_health_item("Activity log", true, "no log file yet");
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<20} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// aidash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective aidash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.aidash/config.toml", global_exists);
    print_source(".aidash.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "AIDASH_* / SUPABASE_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.aidash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Set store.url and store.anon_key to point at your project.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    let shown = if key.ends_with("anon_key") {
        mask(value)
    } else {
        value.to_string()
    };
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), shown);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Keep the first four characters of a secret and hide the rest.
fn mask(secret: &str) -> String {
    let shown: String = secret.chars().take(4).collect();
    if shown.len() == secret.len() {
        "*".repeat(secret.chars().count())
    } else {
        format!("{shown}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_hides_secret_tail() {
        assert_eq!(mask("eyJhbGciOiJIUzI1NiJ9"), "eyJh…");
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask(""), "");
    }
}
