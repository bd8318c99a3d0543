//! Prediction History view: the latest predictions with summary stats.
//!
//! Stats cover only the fetched page (at most [`HISTORY_LIMIT`] rows), not
//! the user's full history.
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::store::{Collection, ListQuery, Prediction, RecordStore, RecordStoreExt};

/// Most recent predictions fetched on mount.
pub const HISTORY_LIMIT: usize = 50;

/// Select clause joining each prediction with its model's name and type.
pub const HISTORY_SELECT: &str = "*,ai_models(name,model_type)";

/// Characters of compact JSON shown before the preview is cut.
pub const PREVIEW_CHARS: usize = 100;

pub const UNKNOWN_MODEL: &str = "Unknown Model";
pub const UNKNOWN_TYPE: &str = "Unknown Type";

/// Colour band of a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

impl ConfidenceBucket {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Summary cards above the list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionStats {
    pub total: usize,
    pub avg_confidence: f64,
    pub this_week: usize,
}

/// Count, mean confidence (0 when empty) and rows created strictly after
/// `now - 7 days`.
pub fn compute_stats(rows: &[Prediction], now: DateTime<Utc>) -> PredictionStats {
    let total = rows.len();
    let avg_confidence = if total == 0 {
        0.0
    } else {
        rows.iter().map(|p| p.confidence_score).sum::<f64>() / total as f64
    };
    let week_ago = now - Duration::days(7);
    let this_week = rows.iter().filter(|p| p.created_at > week_ago).count();

    PredictionStats {
        total,
        avg_confidence,
        this_week,
    }
}

/// Compact JSON cut to `max_chars` characters and suffixed with `...`.
pub fn preview_json(value: &Value, max_chars: usize) -> String {
    let mut preview: String = value.to_string().chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}

/// Score as a percentage with one decimal, e.g. `0.923` → `92.3%`.
pub fn confidence_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

pub fn model_name(prediction: &Prediction) -> &str {
    prediction
        .model
        .as_ref()
        .map(|m| m.name.as_str())
        .unwrap_or(UNKNOWN_MODEL)
}

/// The joined model's type tag as stored, e.g. `sentiment-analysis`.
pub fn model_type(prediction: &Prediction) -> &str {
    prediction
        .model
        .as_ref()
        .map(|m| m.model_type.as_str())
        .unwrap_or(UNKNOWN_TYPE)
}

pub struct PredictionHistory {
    rows: Vec<Prediction>,
    stats: PredictionStats,
}

impl PredictionHistory {
    pub fn mount(store: Rc<dyn RecordStore>, owner: &str) -> Self {
        Self::mount_at(store, owner, Utc::now())
    }

    /// Mount with an explicit clock for the weekly count.
    pub fn mount_at(store: Rc<dyn RecordStore>, owner: &str, now: DateTime<Utc>) -> Self {
        let query = ListQuery::owned_by(owner)
            .columns(HISTORY_SELECT)
            .newest_first("created_at")
            .limit(HISTORY_LIMIT);
        let rows: Vec<Prediction> = store
            .list(Collection::Predictions, &query)
            .unwrap_or_default();
        let stats = compute_stats(&rows, now);
        Self { rows, stats }
    }

    pub fn rows(&self) -> &[Prediction] {
        &self.rows
    }

    pub fn stats(&self) -> PredictionStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LocalStore, ModelSummary};
    use serde_json::json;

    fn prediction(score: f64, created_at: DateTime<Utc>) -> Prediction {
        Prediction {
            id: "p".to_string(),
            user_id: "u1".to_string(),
            model_id: None,
            input_data: json!({}),
            prediction_result: json!({}),
            confidence_score: score,
            created_at,
            model: None,
        }
    }

    #[test]
    fn buckets_at_boundaries() {
        assert_eq!(ConfidenceBucket::from_score(0.8), ConfidenceBucket::High);
        assert_eq!(ConfidenceBucket::from_score(0.79), ConfidenceBucket::Medium);
        assert_eq!(ConfidenceBucket::from_score(0.6), ConfidenceBucket::Medium);
        assert_eq!(ConfidenceBucket::from_score(0.59), ConfidenceBucket::Low);
        assert_eq!(ConfidenceBucket::from_score(1.0), ConfidenceBucket::High);
        assert_eq!(ConfidenceBucket::from_score(0.0), ConfidenceBucket::Low);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = compute_stats(&[], Utc::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_confidence, 0.0);
        assert_eq!(stats.this_week, 0);
    }

    #[test]
    fn week_window_is_strict() {
        let now = Utc::now();
        let rows = vec![
            prediction(0.5, now - Duration::days(7)),
            prediction(0.7, now - Duration::days(7) + Duration::seconds(1)),
        ];
        let stats = compute_stats(&rows, now);
        assert_eq!(stats.this_week, 1);
        assert!((stats.avg_confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn preview_truncates_by_characters() {
        let long = json!({ "text": "x".repeat(200) });
        let preview = preview_json(&long, PREVIEW_CHARS);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(preview.starts_with(r#"{"text":"xxx"#));
        assert!(preview.ends_with("..."));

        assert_eq!(preview_json(&json!({"a":1}), PREVIEW_CHARS), r#"{"a":1}..."#);
    }

    #[test]
    fn confidence_formats_one_decimal() {
        assert_eq!(confidence_percent(0.923), "92.3%");
        assert_eq!(confidence_percent(0.5), "50.0%");
    }

    #[test]
    fn missing_model_falls_back_to_unknown() {
        let mut row = prediction(0.9, Utc::now());
        assert_eq!(model_name(&row), UNKNOWN_MODEL);
        assert_eq!(model_type(&row), UNKNOWN_TYPE);

        row.model = Some(ModelSummary {
            name: "Sentiment Analyzer".to_string(),
            model_type: "sentiment-analysis".to_string(),
        });
        assert_eq!(model_name(&row), "Sentiment Analyzer");
        assert_eq!(model_type(&row), "sentiment-analysis");
    }

    #[test]
    fn mount_joins_seeded_models() {
        let store = Rc::new(LocalStore::new());
        store.seed_demo("u1", "a@b.c").unwrap();
        let view = PredictionHistory::mount(store, "u1");

        assert_eq!(view.stats().total, 5);
        assert_eq!(view.stats().this_week, 3);
        assert!(view.rows().iter().all(|p| p.model.is_some()));
        assert!(view.rows()[0].created_at >= view.rows()[1].created_at);
    }

    #[test]
    fn failed_fetch_is_empty() {
        let store = Rc::new(LocalStore::new());
        store.set_offline(true);
        let view = PredictionHistory::mount(store, "u1");
        assert!(view.is_empty());
        assert_eq!(view.stats().total, 0);
    }
}
