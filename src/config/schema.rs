/// Configuration schema and defaults for aidash.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[store]`, `[completion]`, `[web]` and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

/// Default base URL of the chat completion service.
pub const DEFAULT_COMPLETION_URL: &str = "http://localhost:5000";

/// Default listen address for the dashboard server.
pub const DEFAULT_WEB_ADDR: &str = "127.0.0.1:9747";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level aidash configuration.
///
/// Maps directly to `~/.aidash/config.toml` and `.aidash.toml`. Missing
/// sections and fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub store: StoreConfig,
    pub completion: CompletionConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [store]
// ---------------------------------------------------------------------------

/// Which record store the dashboard talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    /// Hosted PostgREST + GoTrue service (default).
    #[default]
    Remote,
    /// In-process rows, nothing leaves the machine.
    Local,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Connection settings for the record store and its auth service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public anon key sent as the `apikey` header.
    pub anon_key: String,
    /// Per-request timeout. Unset means requests never time out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl StoreConfig {
    /// Whether enough is configured to reach the remote service.
    pub fn is_remote_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// [completion]
// ---------------------------------------------------------------------------

/// Settings for the external chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL; requests go to `{base_url}/api/chat`.
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COMPLETION_URL.to_string(),
            timeout_ms: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Dashboard HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_WEB_ADDR.to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append one JSONL line per remote call to `~/.aidash/activity.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl DashConfig {
    /// The annotated default config written by `aidash config init`.
    pub fn default_toml() -> String {
        r#"# aidash Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (AIDASH_*, SUPABASE_*)
#   2. Project config (.aidash.toml in current directory)
#   3. User global config (~/.aidash/config.toml)
#   4. Built-in defaults

[store]
backend = "remote"     # remote | local
url = ""               # or SUPABASE_URL
anon_key = ""          # or SUPABASE_ANON_KEY
# timeout_ms = 10000   # unset = no timeout

[completion]
base_url = "http://localhost:5000"   # or AIDASH_COMPLETION_URL
# timeout_ms = 30000

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true         # AIDASH_LOGGING=0 to disable
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
