//! Embedded web dashboard for aidash.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page dashboard (sign-in, models, chat, predictions, settings)
//! - JSON API endpoints driving the views held in this process
//!
//! Launched via `aidash serve` (default: `http://127.0.0.1:9747`).
//!
//! The server holds the signed-in store session, so every request passes a
//! [`RequestGuard`] first: the `Host` must name the bound address, and writes
//! need a same-origin `Origin` (when sent) and a JSON `Content-Type`.

mod api;
mod frontend;

use std::io::{Cursor, Read};
use std::rc::Rc;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::auth::Backend;
use crate::completion::CompletionClient;
use crate::config::DashConfig;
use crate::views::Dashboard;

static MODEL_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/api/models/([^/]+)$").expect("model path pattern is valid"));

static SELECT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/api/chat/conversations/([^/]+)/select$")
        .expect("conversation path pattern is valid")
});

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// A handler's answer, before it becomes a `tiny_http` response.
#[derive(Debug)]
pub struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    /// JSON reply with the given status.
    pub(crate) fn json<T: Serialize>(status: u16, data: &T) -> Result<Self> {
        let body = serde_json::to_vec(data).context("failed to serialize JSON response")?;
        Ok(Self {
            status,
            content_type: "application/json; charset=utf-8",
            body,
        })
    }

    pub(crate) fn ok<T: Serialize>(data: &T) -> Result<Self> {
        Self::json(200, data)
    }

    /// `{"error": message}` with the given status.
    pub(crate) fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: serde_json::json!({ "error": message }).to_string().into_bytes(),
        }
    }

    fn html(html: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: html.as_bytes().to_vec(),
        }
    }

    fn not_found() -> Self {
        Self::error(404, "not found")
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Parse the body as JSON.
    pub fn body_json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).context("reply body is not JSON")
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let header = Header::from_bytes("Content-Type", self.content_type)
            .expect("content type header is valid");
        Response::from_data(self.body)
            .with_header(header)
            .with_status_code(StatusCode(self.status))
    }
}

// ---------------------------------------------------------------------------
// Request guard
// ---------------------------------------------------------------------------

/// The request headers the guard inspects.
#[derive(Debug, Default, Clone)]
pub struct RequestHeaders {
    pub host: Option<String>,
    pub origin: Option<String>,
    pub content_type: Option<String>,
}

impl RequestHeaders {
    fn from_request(request: &Request) -> Self {
        let mut headers = Self::default();
        for header in request.headers() {
            let value = Some(header.value.as_str().to_string());
            if header.field.equiv("Host") {
                headers.host = value;
            } else if header.field.equiv("Origin") {
                headers.origin = value;
            } else if header.field.equiv("Content-Type") {
                headers.content_type = value;
            }
        }
        headers
    }
}

/// Rejects requests that did not come from the dashboard page itself.
#[derive(Debug, Clone)]
pub struct RequestGuard {
    hosts: Vec<String>,
}

impl RequestGuard {
    /// Accept `addr` as the host, plus the loopback aliases of its port when
    /// bound to a loopback or wildcard address.
    pub fn for_addr(addr: &str) -> Self {
        let mut hosts = vec![addr.to_ascii_lowercase()];
        if let Some((host, port)) = addr.rsplit_once(':')
            && matches!(host, "127.0.0.1" | "localhost" | "0.0.0.0")
        {
            for alias in ["127.0.0.1", "localhost"] {
                let candidate = format!("{alias}:{port}");
                if !hosts.contains(&candidate) {
                    hosts.push(candidate);
                }
            }
        }
        Self { hosts }
    }

    fn allows_host(&self, host: &str) -> bool {
        let host = host.trim().to_ascii_lowercase();
        self.hosts.iter().any(|h| *h == host)
    }

    /// `None` when the request may proceed, otherwise the rejection.
    ///
    /// A foreign `Host` is refused outright (DNS rebinding). Anything other
    /// than GET/HEAD also needs a matching `Origin` when one is sent and a
    /// JSON `Content-Type`, which a cross-site form or `text/plain` fetch
    /// cannot produce without a preflight.
    pub fn check(&self, method: &Method, headers: &RequestHeaders) -> Option<Reply> {
        if let Some(host) = &headers.host
            && !self.allows_host(host)
        {
            return Some(Reply::error(403, "host not allowed"));
        }
        if matches!(method, Method::Get | Method::Head) {
            return None;
        }

        if let Some(origin) = &headers.origin {
            let same_origin = origin
                .strip_prefix("http://")
                .is_some_and(|host| self.allows_host(host));
            if !same_origin {
                return Some(Reply::error(403, "cross-origin request rejected"));
            }
        }

        let is_json = headers.content_type.as_deref().is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        });
        if !is_json {
            return Some(Reply::error(415, "expected Content-Type: application/json"));
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Everything one dashboard visit needs, plus the signed-in shell if any.
pub struct DashboardServer {
    backend: Backend,
    completion: Rc<dyn CompletionClient>,
    config: DashConfig,
    dashboard: Option<Dashboard>,
}

impl DashboardServer {
    pub fn new(backend: Backend, completion: Rc<dyn CompletionClient>, config: DashConfig) -> Self {
        Self {
            backend,
            completion,
            config,
            dashboard: None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.dashboard.is_some()
    }

    /// Start serving on `addr`.
    ///
    /// Blocks the current thread. Requests are handled one at a time, which
    /// is all a local single-user dashboard needs. A failing handler answers
    /// 500 without taking the server down.
    pub fn serve(mut self, addr: &str, open: bool) -> Result<()> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

        println!("aidash dashboard running at http://{addr}");
        println!(
            "Store: {}  Completion: {}",
            self.backend.name(),
            self.config.completion.base_url
        );
        println!("Press Ctrl+C to stop.\n");

        if open {
            let _ = open_browser(&format!("http://{addr}"));
        }

        let guard = RequestGuard::for_addr(addr);
        for mut request in server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();
            let headers = RequestHeaders::from_request(&request);

            let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
                let mut buf = String::new();
                let _ = request.as_reader().read_to_string(&mut buf);
                Some(buf)
            } else {
                None
            };

            let reply = self
                .handle(&guard, &method, &url, &headers, body.as_deref())
                .unwrap_or_else(|e| Reply::error(500, &format!("{e:#}")));
            let status = reply.status;
            let _ = request.respond(reply.into_response());

            println!(
                "{} {} {} {}",
                method,
                url,
                status,
                chrono::Local::now().format("%H:%M:%S")
            );
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Router
    // -----------------------------------------------------------------------

    /// Screen one request with `guard`, then route it.
    pub fn handle(
        &mut self,
        guard: &RequestGuard,
        method: &Method,
        url: &str,
        headers: &RequestHeaders,
        body: Option<&str>,
    ) -> Result<Reply> {
        if let Some(rejection) = guard.check(method, headers) {
            return Ok(rejection);
        }
        self.dispatch(method, url, body)
    }

    /// Route one request. `Err` becomes a 500.
    pub fn dispatch(&mut self, method: &Method, url: &str, body: Option<&str>) -> Result<Reply> {
        let path = url.split('?').next().unwrap_or(url);
        let body = body.unwrap_or("{}");

        match (method, path) {
            (&Method::Get, "/") | (&Method::Get, "/index.html") => {
                return Ok(Reply::html(frontend::INDEX_HTML));
            }
            (&Method::Get, "/api/session") => return api::get_session(self),
            (&Method::Post, "/api/auth/login") => return api::post_login(self, body),
            (&Method::Post, "/api/auth/logout") => return api::post_logout(self),
            (&Method::Get, "/api/health") => return api::get_health(self),
            _ => {}
        }

        if !path.starts_with("/api/") {
            return Ok(Reply::not_found());
        }
        let Some(dashboard) = self.dashboard.as_mut() else {
            return Ok(Reply::error(401, "not signed in"));
        };

        match (method, path) {
            (&Method::Get, "/api/settings") => api::get_settings(dashboard),

            // Model Manager
            (&Method::Get, "/api/models") => api::get_models(dashboard),
            (&Method::Post, "/api/models") => api::post_model(dashboard, body),

            // Chat
            (&Method::Get, "/api/chat") => api::get_chat(dashboard),
            (&Method::Post, "/api/chat/conversations") => api::post_conversation(dashboard),
            (&Method::Post, "/api/chat/send") => api::post_send(dashboard, body),

            // Prediction History
            (&Method::Get, "/api/predictions") => api::get_predictions(dashboard),

            _ => {
                if *method == Method::Delete
                    && let Some(caps) = MODEL_PATH_RE.captures(path)
                {
                    return api::delete_model(dashboard, &caps[1], url);
                }
                if *method == Method::Post
                    && let Some(caps) = SELECT_PATH_RE.captures(path)
                {
                    return api::post_select_conversation(dashboard, &caps[1]);
                }
                Ok(Reply::not_found())
            }
        }
    }
}

/// Value of `key` in the URL's query string.
pub(crate) fn query_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key { Some(v) } else { None }
    })
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Message;

    struct Canned;

    impl CompletionClient for Canned {
        fn complete(&self, _message: &str, _history: &[Message]) -> Result<Option<String>> {
            Ok(Some("Hi there".to_string()))
        }
    }

    fn server() -> DashboardServer {
        DashboardServer::new(Backend::local(), Rc::new(Canned), DashConfig::default())
    }

    fn signed_in() -> DashboardServer {
        let mut server = server();
        let reply = server
            .dispatch(&Method::Post, "/api/auth/login", Some(r#"{"email":"ada@example.com"}"#))
            .unwrap();
        assert_eq!(reply.status(), 200);
        server
    }

    fn json_post(origin: Option<&str>) -> RequestHeaders {
        RequestHeaders {
            host: Some("127.0.0.1:9747".to_string()),
            origin: origin.map(str::to_string),
            content_type: Some("application/json; charset=utf-8".to_string()),
        }
    }

    #[test]
    fn guard_accepts_same_origin_json() {
        let guard = RequestGuard::for_addr("127.0.0.1:9747");
        assert!(guard.check(&Method::Post, &json_post(None)).is_none());
        assert!(
            guard
                .check(&Method::Post, &json_post(Some("http://127.0.0.1:9747")))
                .is_none()
        );
        assert!(
            guard
                .check(&Method::Post, &json_post(Some("http://localhost:9747")))
                .is_none()
        );
    }

    #[test]
    fn guard_rejects_foreign_origin_and_plain_text() {
        let guard = RequestGuard::for_addr("127.0.0.1:9747");

        let foreign = guard
            .check(&Method::Post, &json_post(Some("https://evil.example")))
            .unwrap();
        assert_eq!(foreign.status(), 403);
        let other_port = guard
            .check(&Method::Delete, &json_post(Some("http://127.0.0.1:8080")))
            .unwrap();
        assert_eq!(other_port.status(), 403);

        let mut plain = json_post(None);
        plain.content_type = Some("text/plain;charset=UTF-8".to_string());
        assert_eq!(guard.check(&Method::Post, &plain).unwrap().status(), 415);
        plain.content_type = None;
        assert_eq!(guard.check(&Method::Post, &plain).unwrap().status(), 415);
    }

    #[test]
    fn guard_rejects_rebound_host() {
        let guard = RequestGuard::for_addr("127.0.0.1:9747");
        let headers = RequestHeaders {
            host: Some("attacker.example:9747".to_string()),
            ..RequestHeaders::default()
        };
        assert_eq!(guard.check(&Method::Get, &headers).unwrap().status(), 403);
        assert!(guard.check(&Method::Get, &RequestHeaders::default()).is_none());
    }

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("/api/models/m1?confirm=true", "confirm"), Some("true"));
        assert_eq!(query_param("/api/models/m1?a=b&confirm=no", "confirm"), Some("no"));
        assert_eq!(query_param("/api/models/m1", "confirm"), None);
    }

    #[test]
    fn frontend_is_served() {
        let reply = server().dispatch(&Method::Get, "/", None).unwrap();
        assert_eq!(reply.status(), 200);
        assert!(reply.content_type.starts_with("text/html"));
    }

    #[test]
    fn api_requires_sign_in() {
        let mut server = server();
        let reply = server.dispatch(&Method::Get, "/api/models", None).unwrap();
        assert_eq!(reply.status(), 401);
        assert_eq!(reply.body_json().unwrap()["error"], "not signed in");
    }

    #[test]
    fn unknown_routes_are_not_found() {
        let mut server = signed_in();
        assert_eq!(server.dispatch(&Method::Get, "/favicon.ico", None).unwrap().status(), 404);
        assert_eq!(server.dispatch(&Method::Get, "/api/billing", None).unwrap().status(), 404);
    }

    #[test]
    fn login_then_logout() {
        let mut server = signed_in();
        assert!(server.is_signed_in());

        let session = server.dispatch(&Method::Get, "/api/session", None).unwrap();
        let json = session.body_json().unwrap();
        assert_eq!(json["signed_in"], true);
        assert_eq!(json["greeting"], "Welcome, ada@example.com");
        assert_eq!(json["tab"], "models");

        let reply = server.dispatch(&Method::Post, "/api/auth/logout", None).unwrap();
        assert_eq!(reply.status(), 200);
        assert!(!server.is_signed_in());
    }

    #[test]
    fn bad_json_is_an_error() {
        let mut server = signed_in();
        assert!(
            server
                .dispatch(&Method::Post, "/api/chat/send", Some("not json"))
                .is_err()
        );
    }
}
