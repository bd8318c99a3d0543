//! Record store client.
//!
//! The dashboard keeps nothing locally: profiles, models, conversations and
//! predictions all live in a hosted row store. Every view talks to it through
//! the [`RecordStore`] trait, which has two implementations:
//!
//! - [`RestStore`]: PostgREST over HTTP (the hosted service)
//! - [`LocalStore`]: in-process rows for offline use and tests
//!
//! Operations are single-shot: no retry, no backoff. Callers decide what a
//! failure means; the views treat it as "no data".

pub mod local;
pub mod records;
pub mod rest;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::activity;

pub use local::LocalStore;
pub use records::{
    Conversation, ConversationPatch, Message, Model, ModelParameters, ModelSummary, ModelType,
    NewConversation, NewModel, Prediction, Profile, Role,
};
pub use rest::RestStore;

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// The four remote collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profiles,
    Models,
    Conversations,
    Predictions,
}

impl Collection {
    /// Remote table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Models => "ai_models",
            Self::Conversations => "ai_conversations",
            Self::Predictions => "ai_predictions",
        }
    }

    /// Column holding the owning user's id. Profiles are keyed by it.
    pub fn owner_column(self) -> &'static str {
        match self {
            Self::Profiles => "id",
            _ => "user_id",
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Sort order of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A list-by-owner query, optionally ordered, joined and limited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub owner: String,
    /// PostgREST select clause, e.g. `*,ai_models(name,model_type)`.
    pub select: String,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// All columns of the rows owned by `owner`.
    pub fn owned_by(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            select: "*".to_string(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    pub fn newest_first(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Row-level access to the remote collections, in raw JSON.
pub trait RecordStore {
    /// Short name for logs and the health report.
    fn name(&self) -> &'static str;

    fn select(&self, collection: Collection, query: &ListQuery) -> Result<Vec<Value>>;

    /// Insert one row and return it as stored (with id and timestamps).
    fn insert(&self, collection: Collection, row: Value) -> Result<Value>;

    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<()>;

    fn delete(&self, collection: Collection, id: &str) -> Result<()>;
}

/// Typed helpers available on every [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    /// List rows as `T`. Rows that don't fit `T` are skipped and noted in
    /// the activity log.
    fn list<T: DeserializeOwned>(&self, collection: Collection, query: &ListQuery) -> Result<Vec<T>> {
        let rows = self.select(collection, query)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<T>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    activity::note(
                        "decode",
                        collection.table(),
                        false,
                        format!("skipped malformed row: {e}"),
                    );
                    None
                }
            })
            .collect())
    }

    fn insert_record<T, R>(&self, collection: Collection, row: &R) -> Result<T>
    where
        T: DeserializeOwned,
        R: Serialize + ?Sized,
    {
        let row = serde_json::to_value(row).context("failed to encode row")?;
        let stored = self.insert(collection, row)?;
        serde_json::from_value(stored)
            .with_context(|| format!("unexpected row shape from {}", collection.table()))
    }

    fn update_record<P: Serialize + ?Sized>(
        &self,
        collection: Collection,
        id: &str,
        patch: &P,
    ) -> Result<()> {
        let patch = serde_json::to_value(patch).context("failed to encode patch")?;
        self.update(collection, id, patch)
    }

    /// The signed-in user's profile, if one exists.
    fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let mut profiles: Vec<Profile> =
            self.list(Collection::Profiles, &ListQuery::owned_by(user_id).limit(1))?;
        Ok(profiles.pop())
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_tables() {
        assert_eq!(Collection::Profiles.table(), "profiles");
        assert_eq!(Collection::Models.table(), "ai_models");
        assert_eq!(Collection::Conversations.table(), "ai_conversations");
        assert_eq!(Collection::Predictions.table(), "ai_predictions");
    }

    #[test]
    fn profiles_are_owned_by_their_id() {
        assert_eq!(Collection::Profiles.owner_column(), "id");
        assert_eq!(Collection::Predictions.owner_column(), "user_id");
    }

    #[test]
    fn list_query_builder() {
        let query = ListQuery::owned_by("u1")
            .columns("*,ai_models(name,model_type)")
            .newest_first("created_at")
            .limit(50);
        assert_eq!(query.owner, "u1");
        assert_eq!(query.select, "*,ai_models(name,model_type)");
        assert_eq!(
            query.order,
            Some(Order {
                column: "created_at".to_string(),
                ascending: false
            })
        );
        assert_eq!(query.limit, Some(50));
    }

    #[test]
    fn list_skips_rows_that_do_not_decode() {
        let store = LocalStore::new();
        store
            .insert(
                Collection::Models,
                serde_json::json!({
                    "user_id": "u1",
                    "name": "ok",
                    "description": "",
                    "model_type": "classification",
                }),
            )
            .unwrap();
        store
            .insert(
                Collection::Models,
                serde_json::json!({
                    "user_id": "u1",
                    "name": "broken",
                    "model_type": "regression",
                }),
            )
            .unwrap();

        let models: Vec<Model> = store
            .list(Collection::Models, &ListQuery::owned_by("u1"))
            .unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "ok");
    }
}
