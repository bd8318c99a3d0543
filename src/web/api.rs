//! JSON API handlers for the web dashboard.
//!
//! Each handler maps one endpoint onto a view operation and returns a
//! [`Reply`] describing the view's state afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{DashboardServer, Reply, query_param};
use crate::activity;
use crate::completion::HttpCompletionClient;
use crate::config;
use crate::store::{Message, ModelType};
use crate::views::predictions::{self, PREVIEW_CHARS};
use crate::views::{
    ChatView, ConfidenceBucket, Dashboard, ModelDraft, ModelManager, PredictionStats, SendOutcome,
    Tab,
};

// ---------------------------------------------------------------------------
// JSON request / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct SessionResponse {
    signed_in: bool,
    backend: &'static str,
    user: Option<UserResponse>,
    greeting: Option<String>,
    tab: Option<Tab>,
    tabs: Vec<TabResponse>,
}

#[derive(Serialize)]
struct UserResponse {
    id: String,
    email: String,
}

#[derive(Serialize)]
struct TabResponse {
    id: &'static str,
    label: &'static str,
}

/// Model Manager state.
#[derive(Serialize)]
struct ModelsResponse {
    models: Vec<ModelCard>,
    creating: bool,
    empty: bool,
    model_types: Vec<ModelTypeOption>,
}

#[derive(Serialize)]
struct ModelCard {
    id: String,
    name: String,
    description: String,
    model_type: ModelType,
    type_label: String,
    created_at: String,
}

#[derive(Serialize)]
struct ModelTypeOption {
    value: &'static str,
    label: &'static str,
}

#[derive(Deserialize)]
struct CreateModelRequest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    model_type: ModelType,
}

#[derive(Serialize)]
struct ModelWriteResponse {
    success: bool,
    #[serde(flatten)]
    state: ModelsResponse,
}

/// Chat state.
#[derive(Serialize)]
struct ChatResponse {
    conversations: Vec<ConversationItem>,
    active_id: Option<String>,
    messages: Vec<Message>,
    empty: bool,
}

#[derive(Serialize)]
struct ConversationItem {
    id: String,
    title: String,
    updated_at: String,
}

#[derive(Deserialize)]
struct SendRequest {
    message: String,
}

#[derive(Serialize)]
struct SendResponse {
    outcome: SendOutcome,
    #[serde(flatten)]
    chat: ChatResponse,
}

/// Prediction History state.
#[derive(Serialize)]
struct PredictionsResponse {
    stats: PredictionStats,
    avg_confidence_label: String,
    rows: Vec<PredictionRow>,
}

#[derive(Serialize)]
struct PredictionRow {
    id: String,
    model_name: String,
    model_type: String,
    input_preview: String,
    result_preview: String,
    confidence: String,
    bucket: ConfidenceBucket,
    date: String,
}

#[derive(Serialize)]
struct HealthResponse {
    backend: &'static str,
    signed_in: bool,
    completion_url: String,
    completion_available: bool,
    config_exists: bool,
    activity_log_enabled: bool,
}

// ---------------------------------------------------------------------------
// View state snapshots
// ---------------------------------------------------------------------------

fn models_state(view: &ModelManager) -> ModelsResponse {
    ModelsResponse {
        models: view
            .models()
            .iter()
            .map(|m| ModelCard {
                id: m.id.clone(),
                name: m.name.clone(),
                description: m.description.clone(),
                model_type: m.model_type,
                type_label: m.model_type.label(),
                created_at: m.created_at.to_rfc3339(),
            })
            .collect(),
        creating: view.is_creating(),
        empty: view.shows_empty_state(),
        model_types: ModelType::ALL
            .into_iter()
            .map(|t| ModelTypeOption {
                value: t.as_str(),
                label: t.display_name(),
            })
            .collect(),
    }
}

fn chat_state(view: &ChatView) -> ChatResponse {
    ChatResponse {
        conversations: view
            .conversations()
            .iter()
            .map(|c| ConversationItem {
                id: c.id.clone(),
                title: c.title.clone(),
                updated_at: c.updated_at.to_rfc3339(),
            })
            .collect(),
        active_id: view.active().map(|c| c.id.clone()),
        messages: view.messages().to_vec(),
        empty: view.shows_empty_state(),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// `GET /api/session`
pub fn get_session(server: &DashboardServer) -> Result<Reply> {
    let dashboard = server.dashboard.as_ref();
    let resp = SessionResponse {
        signed_in: dashboard.is_some(),
        backend: server.backend.name(),
        user: dashboard.map(|d| UserResponse {
            id: d.session().user.id.clone(),
            email: d.session().user.email.clone(),
        }),
        greeting: dashboard.map(Dashboard::greeting),
        tab: dashboard.map(Dashboard::tab),
        tabs: Tab::ALL
            .into_iter()
            .map(|t| TabResponse {
                id: t.id(),
                label: t.label(),
            })
            .collect(),
    };
    Reply::ok(&resp)
}

/// `POST /api/auth/login` with `{ "email": "...", "password": "..." }`.
///
/// A rejected sign-in answers 401 with the service's message.
pub fn post_login(server: &mut DashboardServer, body: &str) -> Result<Reply> {
    let req: LoginRequest =
        serde_json::from_str(body).context("invalid JSON in sign-in request")?;

    let (session, store) = match server.backend.sign_in(&req.email, &req.password) {
        Ok(signed_in) => signed_in,
        Err(e) => return Ok(Reply::error(401, &format!("{e:#}"))),
    };

    server.dashboard = Some(Dashboard::mount(session, store, server.completion.clone()));
    get_session(server)
}

/// `POST /api/auth/logout`: ends the remote session and drops all view state.
pub fn post_logout(server: &mut DashboardServer) -> Result<Reply> {
    if let Some(dashboard) = server.dashboard.take()
        && let Err(e) = server.backend.sign_out(dashboard.session())
    {
        eprintln!("error signing out: {e:#}");
    }
    Reply::ok(&serde_json::json!({ "success": true }))
}

/// `GET /api/settings`
pub fn get_settings(dashboard: &mut Dashboard) -> Result<Reply> {
    dashboard.select_tab(Tab::Settings);
    Reply::ok(&dashboard.settings())
}

// ---------------------------------------------------------------------------
// Model Manager
// ---------------------------------------------------------------------------

/// `GET /api/models`: mounts the tab afresh and lists.
pub fn get_models(dashboard: &mut Dashboard) -> Result<Reply> {
    dashboard.select_tab(Tab::Models);
    Reply::ok(&models_state(dashboard.models()))
}

/// `POST /api/models` with `{ "name", "description", "model_type" }`.
pub fn post_model(dashboard: &mut Dashboard, body: &str) -> Result<Reply> {
    let req: CreateModelRequest =
        serde_json::from_str(body).context("invalid JSON in create model request")?;

    let view = dashboard.models();
    view.open_form();
    *view.draft_mut() = ModelDraft {
        name: req.name,
        description: req.description,
        model_type: req.model_type,
    };
    let success = view.create();

    Reply::ok(&ModelWriteResponse {
        success,
        state: models_state(view),
    })
}

/// `DELETE /api/models/{id}?confirm=true`
///
/// Without `confirm=true` nothing is deleted.
pub fn delete_model(dashboard: &mut Dashboard, id: &str, url: &str) -> Result<Reply> {
    let confirmed = query_param(url, "confirm") == Some("true");
    let view = dashboard.models();
    let success = view.delete(id, |_| confirmed);

    Reply::ok(&ModelWriteResponse {
        success,
        state: models_state(view),
    })
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// `GET /api/chat`: mounts the tab afresh.
pub fn get_chat(dashboard: &mut Dashboard) -> Result<Reply> {
    dashboard.select_tab(Tab::Chat);
    Reply::ok(&chat_state(dashboard.chat()))
}

/// `POST /api/chat/conversations`
pub fn post_conversation(dashboard: &mut Dashboard) -> Result<Reply> {
    let view = dashboard.chat();
    view.new_conversation();
    Reply::ok(&chat_state(view))
}

/// `POST /api/chat/conversations/{id}/select`
pub fn post_select_conversation(dashboard: &mut Dashboard, id: &str) -> Result<Reply> {
    let view = dashboard.chat();
    view.select(id);
    Reply::ok(&chat_state(view))
}

/// `POST /api/chat/send` with `{ "message": "..." }`.
pub fn post_send(dashboard: &mut Dashboard, body: &str) -> Result<Reply> {
    let req: SendRequest =
        serde_json::from_str(body).context("invalid JSON in send request")?;

    let view = dashboard.chat();
    view.set_input(req.message);
    let outcome = view.send();

    Reply::ok(&SendResponse {
        outcome,
        chat: chat_state(view),
    })
}

// ---------------------------------------------------------------------------
// Prediction History
// ---------------------------------------------------------------------------

/// `GET /api/predictions`: mounts the tab afresh.
pub fn get_predictions(dashboard: &mut Dashboard) -> Result<Reply> {
    dashboard.select_tab(Tab::Predictions);
    let view = dashboard.predictions();
    let stats = view.stats();

    let resp = PredictionsResponse {
        stats,
        avg_confidence_label: predictions::confidence_percent(stats.avg_confidence),
        rows: view
            .rows()
            .iter()
            .map(|p| PredictionRow {
                id: p.id.clone(),
                model_name: predictions::model_name(p).to_string(),
                model_type: predictions::model_type(p).to_string(),
                input_preview: predictions::preview_json(&p.input_data, PREVIEW_CHARS),
                result_preview: predictions::preview_json(&p.prediction_result, PREVIEW_CHARS),
                confidence: predictions::confidence_percent(p.confidence_score),
                bucket: ConfidenceBucket::from_score(p.confidence_score),
                date: p.created_at.format("%Y-%m-%d").to_string(),
            })
            .collect(),
    };
    Reply::ok(&resp)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// `GET /api/health`
pub fn get_health(server: &DashboardServer) -> Result<Reply> {
    let completion = HttpCompletionClient::from_config(&server.config.completion);
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false)
        || config::project_config_file()
            .map(|p| p.exists())
            .unwrap_or(false);

    let resp = HealthResponse {
        backend: server.backend.name(),
        signed_in: server.dashboard.is_some(),
        completion_url: completion.base_url().to_string(),
        completion_available: completion.is_healthy(),
        config_exists,
        activity_log_enabled: activity::is_enabled(),
    };
    Reply::ok(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_model_request_defaults() {
        let req: CreateModelRequest = serde_json::from_str(r#"{"name": "Tagger"}"#).unwrap();
        assert_eq!(req.name, "Tagger");
        assert_eq!(req.description, "");
        assert_eq!(req.model_type, ModelType::TextGeneration);
    }

    #[test]
    fn create_model_request_rejects_unknown_type() {
        let json = r#"{"name": "x", "model_type": "regression"}"#;
        assert!(serde_json::from_str::<CreateModelRequest>(json).is_err());
    }

    #[test]
    fn login_request_password_is_optional() {
        let req: LoginRequest = serde_json::from_str(r#"{"email": "a@b.c"}"#).unwrap();
        assert_eq!(req.email, "a@b.c");
        assert!(req.password.is_empty());
    }

    #[test]
    fn send_response_flattens_chat_state() {
        let resp = SendResponse {
            outcome: SendOutcome::Fallback,
            chat: ChatResponse {
                conversations: Vec::new(),
                active_id: None,
                messages: Vec::new(),
                empty: true,
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["outcome"], "fallback");
        assert!(json["active_id"].is_null());
        assert!(json["messages"].as_array().unwrap().is_empty());
    }

    #[test]
    fn prediction_row_serializes_bucket() {
        let row = PredictionRow {
            id: "p1".to_string(),
            model_name: "Unknown Model".to_string(),
            model_type: "Unknown Type".to_string(),
            input_preview: "{}...".to_string(),
            result_preview: "{}...".to_string(),
            confidence: "85.0%".to_string(),
            bucket: ConfidenceBucket::High,
            date: "2026-03-01".to_string(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"bucket\":\"high\""));
    }
}
