/// Configuration system for aidash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::DashConfig::default()`]
/// 2. **User global config**: `~/.aidash/config.toml`
/// 3. **Project local config**: `.aidash.toml` in the current working directory
/// 4. **Environment variables**: overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to defaults.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> DashConfig {
    let mut config = DashConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A broken config file never stops the dashboard.
fn load_toml_file(path: Option<PathBuf>) -> Option<DashConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding the global config and the activity log: `~/.aidash/`.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".aidash"))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".aidash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `AIDASH_COMPLETION_URL`: completion endpoint base URL
/// - `SUPABASE_URL`: record store project URL
/// - `SUPABASE_ANON_KEY`: record store anon key
/// - `AIDASH_STORE_BACKEND`: `remote` or `local`
/// - `AIDASH_WEB_ADDR`: dashboard listen address
/// - `AIDASH_LOGGING`: activity log on/off
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("AIDASH_COMPLETION_URL")
        && !val.is_empty()
    {
        config.completion.base_url = val;
    }
    if let Ok(val) = std::env::var("SUPABASE_URL")
        && !val.is_empty()
    {
        config.store.url = val;
    }
    if let Ok(val) = std::env::var("SUPABASE_ANON_KEY")
        && !val.is_empty()
    {
        config.store.anon_key = val;
    }
    if let Ok(val) = std::env::var("AIDASH_STORE_BACKEND")
        && let Some(backend) = parse_backend(&val)
    {
        config.store.backend = backend;
    }
    if let Ok(val) = std::env::var("AIDASH_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("AIDASH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a store backend name.
pub fn parse_backend(val: &str) -> Option<schema::StoreBackend> {
    match val.to_ascii_lowercase().as_str() {
        "remote" | "supabase" => Some(schema::StoreBackend::Remote),
        "local" | "memory" => Some(schema::StoreBackend::Local),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.aidash/config.toml`.
///
/// Returns an error if the file already exists and `force` is false.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.aidash/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `store.backend`. The file is created from
/// defaults when it does not exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&DashConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut value_table, key, value)?;

    // Reject edits that would leave an unloadable file behind.
    let rendered =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;
    toml::from_str::<DashConfig>(&rendered)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value takes the type of the existing one; keys that are not
/// present yet are parsed as integer, float or bool before falling back to a
/// string.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => infer_toml_value(raw_value),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

fn infer_toml_value(raw_value: &str) -> toml::Value {
    if let Ok(n) = raw_value.parse::<i64>() {
        toml::Value::Integer(n)
    } else if let Ok(f) = raw_value.parse::<f64>() {
        toml::Value::Float(f)
    } else if let Ok(b) = raw_value.parse::<bool>() {
        toml::Value::Boolean(b)
    } else {
        toml::Value::String(raw_value.to_string())
    }
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn parse_backend_handles_aliases() {
        assert_eq!(parse_backend("remote"), Some(schema::StoreBackend::Remote));
        assert_eq!(parse_backend("Supabase"), Some(schema::StoreBackend::Remote));
        assert_eq!(parse_backend("local"), Some(schema::StoreBackend::Local));
        assert_eq!(parse_backend("memory"), Some(schema::StoreBackend::Local));
        assert_eq!(parse_backend("sqlite"), None);
    }

    #[test]
    fn set_toml_value_keeps_existing_types() {
        let mut root: toml::Value =
            toml::from_str(&toml::to_string_pretty(&DashConfig::default()).unwrap()).unwrap();

        set_toml_value(&mut root, "logging.enabled", "off").unwrap();
        set_toml_value(&mut root, "web.addr", "0.0.0.0:8080").unwrap();
        set_toml_value(&mut root, "store.backend", "local").unwrap();

        let config: DashConfig = root.try_into().unwrap();
        assert!(!config.logging.enabled);
        assert_eq!(config.web.addr, "0.0.0.0:8080");
        assert_eq!(config.store.backend, schema::StoreBackend::Local);
    }

    #[test]
    fn set_toml_value_infers_type_for_new_keys() {
        let mut root: toml::Value =
            toml::from_str(&toml::to_string_pretty(&DashConfig::default()).unwrap()).unwrap();

        set_toml_value(&mut root, "completion.timeout_ms", "30000").unwrap();

        let config: DashConfig = root.try_into().unwrap();
        assert_eq!(config.completion.timeout_ms, Some(30_000));
    }

    #[test]
    fn set_toml_value_rejects_unknown_section() {
        let mut root: toml::Value = toml::from_str("[web]\naddr = \"x\"\n").unwrap();
        assert!(set_toml_value(&mut root, "nope.key", "1").is_err());
        assert!(set_toml_value(&mut root, "web..addr", "1").is_err());
    }

    #[test]
    fn set_toml_value_rejects_bad_integer() {
        let mut root: toml::Value = toml::from_str("[store]\ntimeout_ms = 5\n").unwrap();
        assert!(set_toml_value(&mut root, "store.timeout_ms", "soon").is_err());
    }
}
