//! In-process record store.
//!
//! Behaves like the hosted service as far as the dashboard can tell: ids and
//! timestamps are assigned on insert, `updated_at` moves on update, list
//! queries honour owner filter, order, limit and the `ai_models(...)` embed.
//! Used by `aidash serve --local` and by the test suite.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde_json::{Map, Value, json};

use super::{Collection, ListQuery, RecordStore};

/// Matches embedded resources in a select clause: `ai_models(name,model_type)`.
static EMBED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\(([^)]*)\)").expect("embed pattern is valid"));

#[derive(Debug, Default)]
pub struct LocalStore {
    tables: RefCell<HashMap<Collection, Vec<Value>>>,
    offline: Cell<bool>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail, as if the service were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Number of rows currently held for a collection (any owner).
    pub fn row_count(&self, collection: Collection) -> usize {
        self.tables
            .borrow()
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.get() {
            anyhow::bail!("local store is offline");
        }
        Ok(())
    }

    /// Rows for `user_id` so a fresh local sign-in has something to look at.
    ///
    /// Does nothing when the user already owns models.
    pub fn seed_demo(&self, user_id: &str, email: &str) -> Result<()> {
        let has_profile = !self
            .select(Collection::Profiles, &ListQuery::owned_by(user_id))?
            .is_empty();
        if !has_profile {
            self.insert(
                Collection::Profiles,
                json!({ "id": user_id, "email": email, "full_name": null, "avatar_url": null }),
            )?;
        }

        if !self
            .select(Collection::Models, &ListQuery::owned_by(user_id))?
            .is_empty()
        {
            return Ok(());
        }

        let demo_models = [
            ("Text Generator", "Advanced text generation model", "text-generation"),
            ("Sentiment Analyzer", "Analyze text sentiment", "sentiment-analysis"),
            ("Content Classifier", "Classify content into categories", "classification"),
        ];
        let mut model_ids = Vec::new();
        for (name, description, model_type) in demo_models {
            let row = self.insert(
                Collection::Models,
                json!({
                    "user_id": user_id,
                    "name": name,
                    "description": description,
                    "model_type": model_type,
                    "parameters": { "temperature": 0.7, "max_tokens": 1000, "top_p": 1.0 },
                }),
            )?;
            let id = row["id"].as_str().context("inserted model has no id")?;
            model_ids.push(id.to_string());
        }

        let now = Utc::now();
        let demo_predictions = [
            (1usize, json!({ "text": "I love this product" }), json!({ "sentiment": "positive" }), 0.92, 0),
            (2, json!({ "text": "Invoice #1234 overdue" }), json!({ "category": "category_b", "confidence": 0.71 }), 0.71, 2),
            (1, json!({ "text": "Not sure how I feel" }), json!({ "sentiment": "neutral" }), 0.63, 5),
            (0, json!({ "prompt": "Summarize the quarter" }), json!({ "prediction": "Processed input", "value": 42.5 }), 0.55, 12),
            (2, json!({ "text": "Weekly newsletter" }), json!({ "category": "category_a", "confidence": 0.88 }), 0.84, 30),
        ];
        for (model, input, result, confidence, days_ago) in demo_predictions {
            self.insert(
                Collection::Predictions,
                json!({
                    "user_id": user_id,
                    "model_id": model_ids[model],
                    "input_data": input,
                    "prediction_result": result,
                    "confidence_score": confidence,
                    "created_at": (now - Duration::days(days_ago)).to_rfc3339(),
                }),
            )?;
        }

        Ok(())
    }

    /// Resolve `table(col,...)` embeds for one row.
    fn embed(&self, row: &mut Map<String, Value>, select: &str) {
        let tables = self.tables.borrow();
        for caps in EMBED_RE.captures_iter(select) {
            let Some(target) = collection_by_table(&caps[1]) else {
                continue;
            };
            let columns: Vec<&str> = caps[2].split(',').map(str::trim).collect();
            let foreign_key = foreign_key_for(target);

            let embedded = row
                .get(foreign_key)
                .and_then(Value::as_str)
                .and_then(|fk| {
                    tables
                        .get(&target)?
                        .iter()
                        .find(|r| r["id"].as_str() == Some(fk))
                })
                .map(|referenced| {
                    let projected: Map<String, Value> = columns
                        .iter()
                        .map(|c| (c.to_string(), referenced[*c].clone()))
                        .collect();
                    Value::Object(projected)
                })
                .unwrap_or(Value::Null);

            row.insert(caps[1].to_string(), embedded);
        }
    }
}

impl RecordStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn select(&self, collection: Collection, query: &ListQuery) -> Result<Vec<Value>> {
        self.ensure_online()?;

        let owner_column = collection.owner_column();
        let mut rows: Vec<Value> = self
            .tables
            .borrow()
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .rev()
                    .filter(|r| r[owner_column].as_str() == Some(query.owner.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(&a[&order.column], &b[&order.column]);
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if query.select.contains('(') {
            for row in &mut rows {
                if let Value::Object(map) = row {
                    self.embed(map, &query.select);
                }
            }
        }

        Ok(rows)
    }

    fn insert(&self, collection: Collection, row: Value) -> Result<Value> {
        self.ensure_online()?;

        let Value::Object(mut map) = row else {
            anyhow::bail!("insert into {} expects a JSON object", collection.table());
        };

        let now = Value::String(Utc::now().to_rfc3339());
        if !map.contains_key("id") {
            map.insert(
                "id".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
        map.entry("created_at").or_insert_with(|| now.clone());
        if has_updated_at(collection) {
            map.entry("updated_at").or_insert(now);
        }

        let stored = Value::Object(map);
        self.tables
            .borrow_mut()
            .entry(collection)
            .or_default()
            .push(stored.clone());

        Ok(stored)
    }

    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<()> {
        self.ensure_online()?;

        let Value::Object(patch) = patch else {
            anyhow::bail!("update of {} expects a JSON object", collection.table());
        };

        let mut tables = self.tables.borrow_mut();
        let Some(row) = tables
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|r| r["id"].as_str() == Some(id)))
        else {
            // Matches the hosted service: no matching row is not an error.
            return Ok(());
        };

        if let Value::Object(map) = row {
            let touch = has_updated_at(collection) && !patch.contains_key("updated_at");
            map.extend(patch);
            if touch {
                map.insert(
                    "updated_at".to_string(),
                    Value::String(Utc::now().to_rfc3339()),
                );
            }
        }

        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.ensure_online()?;

        if let Some(rows) = self.tables.borrow_mut().get_mut(&collection) {
            rows.retain(|r| r["id"].as_str() != Some(id));
        }
        Ok(())
    }
}

fn has_updated_at(collection: Collection) -> bool {
    !matches!(collection, Collection::Predictions)
}

fn collection_by_table(table: &str) -> Option<Collection> {
    [
        Collection::Profiles,
        Collection::Models,
        Collection::Conversations,
        Collection::Predictions,
    ]
    .into_iter()
    .find(|c| c.table() == table)
}

fn foreign_key_for(target: Collection) -> &'static str {
    match target {
        Collection::Models => "model_id",
        Collection::Conversations => "conversation_id",
        Collection::Predictions => "prediction_id",
        Collection::Profiles => "user_id",
    }
}

/// Order JSON scalars: timestamps chronologically, numbers numerically,
/// everything else as strings. Nulls sort first.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => a.to_string().cmp(&b.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
