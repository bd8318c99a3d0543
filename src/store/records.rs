//! Typed rows of the four dashboard collections.
//!
//! Field names match the remote tables so rows (de)serialize directly from
//! PostgREST JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// profiles
// ---------------------------------------------------------------------------

/// A user profile. Read-only from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ai_models
// ---------------------------------------------------------------------------

/// The fixed set of model kinds a configuration can declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    #[default]
    TextGeneration,
    ImageAnalysis,
    SentimentAnalysis,
    Classification,
}

impl ModelType {
    pub const ALL: [ModelType; 4] = [
        Self::TextGeneration,
        Self::ImageAnalysis,
        Self::SentimentAnalysis,
        Self::Classification,
    ];

    /// Wire tag, e.g. `text-generation`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextGeneration => "text-generation",
            Self::ImageAnalysis => "image-analysis",
            Self::SentimentAnalysis => "sentiment-analysis",
            Self::Classification => "classification",
        }
    }

    /// Human name used in the creation form's select box.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::TextGeneration => "Text Generation",
            Self::ImageAnalysis => "Image Analysis",
            Self::SentimentAnalysis => "Sentiment Analysis",
            Self::Classification => "Classification",
        }
    }

    /// Card label: first hyphen replaced by a space, upper-cased.
    pub fn label(self) -> String {
        type_label(self.as_str())
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown model type: '{s}'"))
    }
}

/// Label for a raw type tag, as shown on model cards.
pub fn type_label(tag: &str) -> String {
    tag.replacen('-', " ", 1).to_uppercase()
}

/// Generation parameters stored with every new model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            top_p: 1.0,
        }
    }
}

/// A model configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub model_type: ModelType,
    /// Free-form parameter bag; see [`ModelParameters`] for what the
    /// dashboard writes.
    #[serde(default)]
    pub parameters: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for `ai_models`.
#[derive(Debug, Clone, Serialize)]
pub struct NewModel {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub model_type: ModelType,
    pub parameters: ModelParameters,
}

// ---------------------------------------------------------------------------
// ai_conversations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of a conversation's message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A stored conversation with its embedded message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub model_id: Option<String>,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for `ai_conversations`.
#[derive(Debug, Clone, Serialize)]
pub struct NewConversation {
    pub user_id: String,
    pub title: String,
    pub messages: Vec<Message>,
}

/// Update payload written after every exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationPatch {
    pub messages: Vec<Message>,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ai_predictions
// ---------------------------------------------------------------------------

/// Name and type of the model a prediction references (embedded join).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub model_type: String,
}

/// A prediction record. Read-only from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub input_data: Value,
    #[serde(default)]
    pub prediction_result: Value,
    #[serde(default)]
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
    /// Present when the list was fetched with the `ai_models` embed.
    #[serde(rename = "ai_models", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSummary>,
}

/// Deserialize JSON `null` as the type's default (`[]`, `""`).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_type_labels_replace_first_hyphen() {
        assert_eq!(ModelType::TextGeneration.label(), "TEXT GENERATION");
        assert_eq!(ModelType::Classification.label(), "CLASSIFICATION");
        assert_eq!(type_label("a-b-c"), "A B-C");
    }

    #[test]
    fn model_type_parses_wire_tags() {
        assert_eq!(
            "sentiment-analysis".parse::<ModelType>().unwrap(),
            ModelType::SentimentAnalysis
        );
        assert!("regression".parse::<ModelType>().is_err());
    }

    #[test]
    fn default_parameters() {
        let params = serde_json::to_value(ModelParameters::default()).unwrap();
        assert_eq!(
            params,
            json!({ "temperature": 0.7, "max_tokens": 1000, "top_p": 1.0 })
        );
    }

    #[test]
    fn conversation_with_null_messages_has_empty_log() {
        let row = json!({
            "id": "c1",
            "user_id": "u1",
            "model_id": null,
            "title": "New Conversation",
            "messages": null,
            "created_at": "2026-03-01T10:00:00.123456+00:00",
            "updated_at": "2026-03-01T10:00:00+00:00"
        });
        let conversation: Conversation = serde_json::from_value(row).unwrap();
        assert!(conversation.messages.is_empty());
        assert!(conversation.model_id.is_none());
    }

    #[test]
    fn prediction_reads_embedded_model() {
        let row = json!({
            "id": "p1",
            "user_id": "u1",
            "model_id": "m1",
            "input_data": { "text": "great product" },
            "prediction_result": { "sentiment": "positive" },
            "confidence_score": 0.91,
            "created_at": "2026-03-01T10:00:00Z",
            "ai_models": { "name": "Sentiment", "model_type": "sentiment-analysis" }
        });
        let prediction: Prediction = serde_json::from_value(row).unwrap();
        assert_eq!(prediction.model.unwrap().name, "Sentiment");
    }

    #[test]
    fn message_roles_serialize_lowercase() {
        let value = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"], "hi");
        assert!(value["timestamp"].is_string());
    }
}
