//! Dashboard views.
//!
//! Each view owns its state and talks to the record store directly. The
//! [`shell::Dashboard`] decides which one is mounted.

pub mod chat;
pub mod models;
pub mod predictions;
pub mod shell;

pub use chat::{ChatView, SendOutcome};
pub use models::{ModelDraft, ModelManager};
pub use predictions::{ConfidenceBucket, PredictionHistory, PredictionStats};
pub use shell::{ActiveView, Dashboard, SettingsPanel, Tab};
