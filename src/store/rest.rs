//! PostgREST client for the hosted row store.
//!
//! Talks to `{url}/rest/v1/{table}` with the synchronous `ureq` client. Every
//! request carries the project's anon key and the signed-in user's access
//! token; row-level security on the service does the rest.
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::Value;

use super::{Collection, ListQuery, RecordStore};
use crate::activity;
use crate::config::schema::StoreConfig;

/// PostgREST-backed [`RecordStore`], bound to one user session.
#[derive(Debug)]
pub struct RestStore {
    base_url: String,
    anon_key: String,
    access_token: String,
    agent: ureq::Agent,
}

impl RestStore {
    /// Build a store for the session identified by `access_token`.
    pub fn new(config: &StoreConfig, access_token: &str) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: access_token.to_string(),
            agent: build_agent(config.timeout_ms),
        }
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.table())
    }

    fn request(&self, method: &str, collection: Collection) -> ureq::Request {
        self.agent
            .request(method, &self.table_url(collection))
            .set("apikey", &self.anon_key)
            .set("Authorization", &format!("Bearer {}", self.access_token))
    }

    fn try_select(&self, collection: Collection, query: &ListQuery) -> Result<Vec<Value>> {
        let mut request = self
            .request("GET", collection)
            .query("select", &query.select)
            .query(collection.owner_column(), &format!("eq.{}", query.owner));

        if let Some(order) = &query.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            request = request.query("order", &format!("{}.{}", order.column, direction));
        }
        if let Some(limit) = query.limit {
            request = request.query("limit", &limit.to_string());
        }

        execute(request, None)?
            .into_json()
            .with_context(|| format!("failed to parse {} rows", collection.table()))
    }

    fn try_insert(&self, collection: Collection, row: &Value) -> Result<Value> {
        let request = self
            .request("POST", collection)
            .set("Prefer", "return=representation");

        let mut rows: Vec<Value> = execute(request, Some(row))?
            .into_json()
            .with_context(|| format!("failed to parse inserted {} row", collection.table()))?;

        if rows.is_empty() {
            anyhow::bail!("insert into {} returned no row", collection.table());
        }
        Ok(rows.swap_remove(0))
    }

    fn try_update(&self, collection: Collection, id: &str, patch: &Value) -> Result<()> {
        let request = self
            .request("PATCH", collection)
            .query("id", &format!("eq.{id}"))
            .set("Prefer", "return=minimal");
        execute(request, Some(patch))?;
        Ok(())
    }

    fn try_delete(&self, collection: Collection, id: &str) -> Result<()> {
        let request = self
            .request("DELETE", collection)
            .query("id", &format!("eq.{id}"));
        execute(request, None)?;
        Ok(())
    }
}

impl RecordStore for RestStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn select(&self, collection: Collection, query: &ListQuery) -> Result<Vec<Value>> {
        let started = Instant::now();
        let result = self.try_select(collection, query);
        activity::record("select", collection.table(), started, &result);
        result
    }

    fn insert(&self, collection: Collection, row: Value) -> Result<Value> {
        let started = Instant::now();
        let result = self.try_insert(collection, &row);
        activity::record("insert", collection.table(), started, &result);
        result
    }

    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<()> {
        let started = Instant::now();
        let result = self.try_update(collection, id, &patch);
        activity::record("update", collection.table(), started, &result);
        result
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let started = Instant::now();
        let result = self.try_delete(collection, id);
        activity::record("delete", collection.table(), started, &result);
        result
    }
}

/// Build a `ureq` agent; no timeout unless one is configured.
pub(crate) fn build_agent(timeout_ms: Option<u64>) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new();
    if let Some(ms) = timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    builder.build()
}

/// Send a request and turn non-2xx statuses into errors carrying the body.
pub(crate) fn execute(request: ureq::Request, body: Option<&Value>) -> Result<ureq::Response> {
    let result = match body {
        Some(body) => request.send_json(body),
        None => request.call(),
    };

    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(code, response)) => {
            let text = response.into_string().unwrap_or_default();
            anyhow::bail!("HTTP {code}: {}", text.trim())
        }
        Err(e) => Err(anyhow::Error::new(e).context("request failed")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> StoreConfig {
        StoreConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn table_url_strips_trailing_slash() {
        let store = RestStore::new(&config("https://demo.supabase.co/"), "token");
        assert_eq!(
            store.table_url(Collection::Conversations),
            "https://demo.supabase.co/rest/v1/ai_conversations"
        );
    }

    #[test]
    fn unreachable_service_is_an_error() {
        // Port 9 (discard) on localhost is closed on any sane test machine.
        let store = RestStore::new(&config("http://127.0.0.1:9"), "token");
        let result = store.select(Collection::Models, &ListQuery::owned_by("u1"));
        assert!(result.is_err());
    }
}
