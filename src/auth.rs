//! Sign-in and sign-out against the managed auth service.
//!
//! The dashboard never stores credentials. A successful sign-in yields a
//! [`Session`] whose access token scopes every record store request for the
//! rest of the visit.
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::activity;
use crate::config::DashConfig;
use crate::config::schema::{StoreBackend, StoreConfig};
use crate::store::rest::{build_agent, execute};
use crate::store::{LocalStore, RecordStore, RestStore};

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

// ---------------------------------------------------------------------------
// GoTrue client
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: User,
}

/// Client for the hosted auth endpoints under `{url}/auth/v1`.
#[derive(Debug)]
pub struct AuthClient {
    base_url: String,
    anon_key: String,
    agent: ureq::Agent,
}

impl AuthClient {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            agent: build_agent(config.timeout_ms),
        }
    }

    /// Exchange email and password for a session.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let started = Instant::now();
        let result = self.try_sign_in(email, password);
        activity::record("sign_in", "auth", started, &result);
        result
    }

    fn try_sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let request = self
            .agent
            .post(&url)
            .query("grant_type", "password")
            .set("apikey", &self.anon_key);
        let body = serde_json::to_value(PasswordGrant { email, password })
            .context("failed to encode sign-in request")?;

        let token: TokenResponse = execute(request, Some(&body))
            .context("sign-in rejected")?
            .into_json()
            .context("failed to parse sign-in response")?;

        Ok(Session {
            access_token: token.access_token,
            user: token.user,
        })
    }

    /// End the session on the server.
    pub fn sign_out(&self, session: &Session) -> Result<()> {
        let started = Instant::now();
        let url = format!("{}/auth/v1/logout", self.base_url);
        let request = self
            .agent
            .post(&url)
            .set("apikey", &self.anon_key)
            .set("Authorization", &format!("Bearer {}", session.access_token));
        let result = execute(request, None).map(|_| ());
        activity::record("sign_out", "auth", started, &result);
        result
    }

    /// Whether the auth service answers its health probe.
    pub fn is_healthy(&self) -> bool {
        let url = format!("{}/auth/v1/health", self.base_url);
        self.agent
            .get(&url)
            .set("apikey", &self.anon_key)
            .call()
            .is_ok()
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// Where sessions and rows come from.
pub enum Backend {
    /// Hosted auth + PostgREST.
    Remote {
        auth: AuthClient,
        config: StoreConfig,
    },
    /// Everything in process. Any non-empty email signs in.
    Local { store: Rc<LocalStore> },
}

impl Backend {
    /// Pick the backend named in the config.
    pub fn from_config(config: &DashConfig) -> Result<Self> {
        match config.store.backend {
            StoreBackend::Local => Ok(Self::local()),
            StoreBackend::Remote => {
                if !config.store.is_remote_configured() {
                    anyhow::bail!(
                        "remote store is not configured: set SUPABASE_URL and SUPABASE_ANON_KEY \
                         (or store.url / store.anon_key), or use --local"
                    );
                }
                Ok(Self::Remote {
                    auth: AuthClient::from_config(&config.store),
                    config: config.store.clone(),
                })
            }
        }
    }

    pub fn local() -> Self {
        Self::Local {
            store: Rc::new(LocalStore::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Remote { .. } => "remote",
            Self::Local { .. } => "local",
        }
    }

    /// Sign in and return the session with a store scoped to it.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<(Session, Rc<dyn RecordStore>)> {
        match self {
            Self::Remote { auth, config } => {
                let session = auth.sign_in(email, password)?;
                let store: Rc<dyn RecordStore> =
                    Rc::new(RestStore::new(config, &session.access_token));
                Ok((session, store))
            }
            Self::Local { store } => {
                let email = email.trim();
                if email.is_empty() {
                    anyhow::bail!("email is required");
                }
                let user = User {
                    id: local_user_id(email),
                    email: email.to_string(),
                };
                store.seed_demo(&user.id, &user.email)?;
                let session = Session {
                    access_token: String::new(),
                    user,
                };
                let store: Rc<dyn RecordStore> = store.clone();
                Ok((session, store))
            }
        }
    }

    pub fn sign_out(&self, session: &Session) -> Result<()> {
        match self {
            Self::Remote { auth, .. } => auth.sign_out(session),
            Self::Local { .. } => Ok(()),
        }
    }
}

/// Stable user id for a local sign-in.
fn local_user_id(email: &str) -> String {
    format!("local:{}", email.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
