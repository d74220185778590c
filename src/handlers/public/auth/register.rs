use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::approval::issuer;
use crate::auth::hash_password;
use crate::database::models::{AdminRequest, Role, User};
use crate::error::ApiError;
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// "student" (default) or "admin". Requesting admin creates a pending
    /// approval request; the account starts as Student either way.
    #[serde(default)]
    pub requested_role: Option<String>,
}

/// POST /auth/register - Register new user account
///
/// Every account is created with the Student role. When the registrant
/// requests Admin, a pending approval request is recorded and signed
/// approve/reject links are emailed to the configured approver; a failed
/// send never rolls the registration back.
///
/// Expected Input:
/// ```json
/// {
///   "name": "string",
///   "email": "string",
///   "password": "string (min 8 chars)",
///   "requested_role": "student | admin (optional)"
/// }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "user": {
///       "id": "uuid",
///       "name": "...",
///       "email": "...",
///       "role": "student",
///       "admin_request": { "status": "pending", "requested_at": "..." }
///     }
///   }
/// }
/// ```
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }

    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let wants_admin = match payload.requested_role.as_deref() {
        None | Some("student") => false,
        Some("admin") => true,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "Unknown requested_role {other:?}; expected \"student\" or \"admin\""
            )))
        }
    };

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email,
        password_hash: hash_password(&payload.password)?,
        role: Role::Student,
        admin_request: wants_admin.then(|| AdminRequest::pending(now)),
        created_at: now,
        updated_at: now,
    };

    state.store.create_user(&user).await?;
    tracing::info!(user_id = %user.id, requested_admin = wants_admin, "Registered new user");

    if wants_admin {
        let base_url = base_url(&state, &headers);
        issuer::issue(&user, &base_url, &state.config.approval, state.mailer.as_ref()).await;
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": { "user": user }
        })),
    ))
}

/// Externally reachable base URL for the action links: the configured
/// public URL, else derived from the inbound request's host.
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.config.server.public_url {
        return url.clone();
    }
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}")
}
