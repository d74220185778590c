use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::{response::IntoResponse, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::auth::{jwt_auth, require_prime_admin};
use crate::state::AppState;

/// Build the full application router. Lives in the library rather than
/// `main.rs` so tests can drive it in-process with injected fixtures.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(email_action_routes())
        // Protected API
        .merge(whoami_routes(state.clone()))
        .merge(admin_review_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

/// The emailed action links. Unauthenticated: the HMAC signature inside
/// each link is the credential.
fn email_action_routes() -> Router<AppState> {
    use public::admin::email_action;

    Router::new()
        .route("/api/admin/email/approve/:user_id", get(email_action::approve))
        .route("/api/admin/email/reject/:user_id", get(email_action::reject))
}

fn whoami_routes(state: AppState) -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route_layer(from_fn_with_state(state, jwt_auth))
}

/// Dashboard review path, restricted to the Prime Admin. `jwt_auth` is
/// the outer layer so the role gate always sees an injected `AuthUser`.
fn admin_review_routes(state: AppState) -> Router<AppState> {
    use protected::admin::requests;

    Router::new()
        .route("/api/admin/requests", get(requests::list))
        .route("/api/admin/requests/:user_id/approve", post(requests::approve))
        .route("/api/admin/requests/:user_id/reject", post(requests::reject))
        .route_layer(from_fn(require_prime_admin))
        .route_layer(from_fn_with_state(state, jwt_auth))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Eventify Approval API",
            "version": version,
            "description": "Signed email links and dashboard review for admin role elevation",
            "endpoints": {
                "home": "/ (public)",
                "register": "POST /auth/register (public)",
                "login": "POST /auth/login (public)",
                "email_actions": "GET /api/admin/email/{approve,reject}/:user_id (signed links)",
                "whoami": "GET /api/auth/whoami (protected)",
                "requests": "/api/admin/requests[/:user_id/{approve,reject}] (Prime Admin)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
