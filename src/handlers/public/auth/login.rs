use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_token, verify_password, AuthError};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate and receive a JWT
///
/// Expected Input:
/// ```json
/// { "email": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": "uuid", "email": "...", "role": "student" },
///     "expires_in": 86400
///   }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    // A missing account and a wrong password produce the same response.
    let user = state
        .store
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    verify_password(&payload.password, &user.password_hash)?;

    let expiry_hours = state.config.security.jwt_expiry_hours;
    let token = generate_token(&user, &state.config.security.jwt_secret, expiry_hours)?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "user": user,
            "expires_in": expiry_hours * 3600
        }
    })))
}
