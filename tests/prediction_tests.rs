/// Integration tests for the Prediction History view.
use std::rc::Rc;

use aidash::store::{Collection, LocalStore, RecordStore};
use aidash::views::predictions::{self, HISTORY_LIMIT, UNKNOWN_MODEL, UNKNOWN_TYPE};
use aidash::views::{ConfidenceBucket, PredictionHistory};
use chrono::{Duration, Utc};
use serde_json::json;

fn insert_prediction(store: &LocalStore, model_id: Option<&str>, score: f64, age: Duration) {
    store
        .insert(
            Collection::Predictions,
            json!({
                "user_id": "u1",
                "model_id": model_id,
                "input_data": { "text": "sample" },
                "prediction_result": { "label": "ok" },
                "confidence_score": score,
                "created_at": (Utc::now() - age).to_rfc3339(),
            }),
        )
        .unwrap();
}

#[test]
fn stats_cover_the_capped_page() {
    let store = Rc::new(LocalStore::new());
    for day in 1..=3 {
        insert_prediction(&store, None, 0.9, Duration::days(day));
    }
    for day in 10..67 {
        insert_prediction(&store, None, 0.5, Duration::days(day));
    }
    assert_eq!(store.row_count(Collection::Predictions), 60);

    let view = PredictionHistory::mount_at(store, "u1", Utc::now());
    let stats = view.stats();
    assert_eq!(stats.total, HISTORY_LIMIT);
    assert_eq!(stats.this_week, 3);

    // 3 rows at 0.9 and 47 at 0.5 make it onto the page.
    let expected = (3.0 * 0.9 + 47.0 * 0.5) / 50.0;
    assert!((stats.avg_confidence - expected).abs() < 1e-9);

    let newest = &view.rows()[0];
    let oldest = view.rows().last().unwrap();
    assert!(newest.created_at > oldest.created_at);
}

#[test]
fn rows_join_model_metadata() {
    let store = Rc::new(LocalStore::new());
    let model = store
        .insert(
            Collection::Models,
            json!({ "user_id": "u1", "name": "Sorter", "model_type": "image-analysis" }),
        )
        .unwrap();
    let model_id = model["id"].as_str().unwrap().to_string();

    insert_prediction(&store, Some(&model_id), 0.85, Duration::hours(1));
    insert_prediction(&store, Some("deleted-model"), 0.2, Duration::hours(2));

    let view = PredictionHistory::mount(store, "u1");
    let rows = view.rows();
    assert_eq!(predictions::model_name(&rows[0]), "Sorter");
    assert_eq!(predictions::model_type(&rows[0]), "image-analysis");
    assert_eq!(predictions::model_name(&rows[1]), UNKNOWN_MODEL);
    assert_eq!(predictions::model_type(&rows[1]), UNKNOWN_TYPE);

    assert_eq!(
        ConfidenceBucket::from_score(rows[0].confidence_score),
        ConfidenceBucket::High
    );
    assert_eq!(
        ConfidenceBucket::from_score(rows[1].confidence_score),
        ConfidenceBucket::Low
    );
}

#[test]
fn bucket_follows_thresholds_across_range() {
    for i in 0..=100 {
        let score = i as f64 / 100.0;
        let bucket = ConfidenceBucket::from_score(score);
        let expected = if score >= 0.8 {
            ConfidenceBucket::High
        } else if score >= 0.6 {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        };
        assert_eq!(bucket, expected, "score {score}");
    }
}

#[test]
fn other_users_predictions_are_hidden() {
    let store = Rc::new(LocalStore::new());
    store.seed_demo("u2", "other@example.com").unwrap();

    let view = PredictionHistory::mount(store, "u1");
    assert!(view.is_empty());
    assert_eq!(view.stats().avg_confidence, 0.0);
}
