//! Shared in-process test harness.
//!
//! Drives the real router via `tower::ServiceExt::oneshot` against the
//! in-memory store and a recording mailer, so the suite needs neither a
//! running Postgres nor SES credentials.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use eventify_api::approval::signature::{sign, signing_message};
use eventify_api::approval::ApprovalAction;
use eventify_api::auth::generate_token;
use eventify_api::config::{
    AppConfig, ApprovalConfig, DatabaseConfig, EmailConfig, Environment, SecurityConfig,
    ServerConfig,
};
use eventify_api::database::memory::MemoryUserStore;
use eventify_api::database::models::{AdminRequest, Role, User};
use eventify_api::email::{EmailMessage, MailError, Mailer};
use eventify_api::routes::app;
use eventify_api::state::AppState;

pub const SIGNING_SECRET: &str = "integration-test-signing-secret";
pub const JWT_SECRET: &str = "integration-test-jwt-secret";
pub const APPROVER: &str = "approver@campus.edu";
pub const PUBLIC_URL: &str = "https://events.campus.edu";

/// Mailer that records every message instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, EmailMessage)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), message.clone()));
        Ok(())
    }
}

/// Mailer that always fails, for the graceful-degradation tests.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _to: &str, _message: &EmailMessage) -> Result<(), MailError> {
        Err(MailError::Send("simulated delivery failure".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryUserStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig {
            port: 0,
            public_url: Some(PUBLIC_URL.to_string()),
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        security: SecurityConfig {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_expiry_hours: 24,
        },
        approval: ApprovalConfig {
            signing_secret: SIGNING_SECRET.to_string(),
            approver_email: APPROVER.to_string(),
            link_lifetime_hours: 24,
        },
        email: EmailConfig {
            from_address: "noreply@eventify.local".to_string(),
            enabled: false,
        },
    }
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryUserStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        config: Arc::new(test_config()),
        store: store.clone(),
        mailer: mailer.clone(),
    };
    TestApp {
        router: app(state),
        store,
        mailer,
    }
}

/// Variant whose mailer always fails, to check that registration still
/// succeeds and the request stays pending.
pub fn test_app_with_failing_mailer() -> TestApp {
    let store = Arc::new(MemoryUserStore::new());
    let state = AppState {
        config: Arc::new(test_config()),
        store: store.clone(),
        mailer: Arc::new(FailingMailer),
    };
    TestApp {
        router: app(state),
        store,
        // Unused recorder so the struct shape stays the same.
        mailer: Arc::new(RecordingMailer::default()),
    }
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router call failed")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.request(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Response {
        self.request(
            Request::builder()
                .uri(path)
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_auth(&self, path: &str, token: &str) -> Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Register a user through the API and return the created user JSON.
    pub async fn register(&self, name: &str, email: &str, requested_role: Option<&str>) -> Value {
        let mut payload = json!({
            "name": name,
            "email": email,
            "password": "a sufficiently long password",
        });
        if let Some(role) = requested_role {
            payload["requested_role"] = json!(role);
        }
        let response = self.post_json("/auth/register", payload).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"]["user"].clone()
    }

    /// Register requesting Admin and return (subject id, approve path,
    /// reject path) lifted from the approver email.
    pub async fn register_requesting_admin(&self, name: &str, email: &str) -> (Uuid, String, String) {
        let user = self.register(name, email, Some("admin")).await;
        let user_id = Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();

        let sent = self.mailer.sent.lock().unwrap();
        let (to, message) = sent.last().expect("no approver email recorded");
        assert_eq!(to, APPROVER);
        let approve = relative_path(&extract_url(&message.text, "Approve: "));
        let reject = relative_path(&extract_url(&message.text, "Reject: "));
        (user_id, approve, reject)
    }

    /// Craft a signed action path directly, with full control of expiry
    /// and secret.
    pub fn signed_action_path(
        &self,
        subject: Uuid,
        action: ApprovalAction,
        expires_at_ms: i64,
        secret: &str,
    ) -> String {
        let sig = sign(
            &signing_message(&subject, action, expires_at_ms),
            secret.as_bytes(),
        );
        format!(
            "/api/admin/email/{}/{subject}?exp={expires_at_ms}&sig={sig}",
            action.as_str()
        )
    }

    /// Load a user straight from the store for state assertions.
    pub async fn stored_user(&self, id: Uuid) -> User {
        use eventify_api::database::store::UserStore;
        self.store.find_by_id(id).await.unwrap().expect("user not stored")
    }

    /// Seed a Prime Admin account directly and mint a token for it.
    pub async fn seed_prime_admin(&self) -> (User, String) {
        let user = self.seed_user("Prime Admin", "prime@campus.edu", Role::PrimeAdmin, None).await;
        let token = generate_token(&user, JWT_SECRET, 1).unwrap();
        (user, token)
    }

    pub async fn seed_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
        admin_request: Option<AdminRequest>,
    ) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            role,
            admin_request,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(user.clone()).await;
        user
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn expiry_from_now(delta: chrono::Duration) -> i64 {
    (Utc::now() + delta).timestamp_millis()
}

pub fn hours(h: i64) -> Duration {
    Duration::hours(h)
}

pub fn query_param(url: &str, key: &str) -> Option<String> {
    let query = url.split('?').nth(1)?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(&format!("{key}=")))
        .map(str::to_string)
}

fn extract_url(text: &str, prefix: &str) -> String {
    text.lines()
        .find_map(|line| line.trim().strip_prefix(prefix))
        .unwrap_or_else(|| panic!("no line starting with {prefix:?} in email"))
        .trim()
        .to_string()
}

fn relative_path(url: &str) -> String {
    url.strip_prefix(PUBLIC_URL)
        .unwrap_or_else(|| panic!("link {url:?} does not start with {PUBLIC_URL}"))
        .to_string()
}
