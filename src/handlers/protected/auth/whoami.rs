use axum::extract::{Extension, State};
use axum::response::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/auth/whoami - Current authenticated user
///
/// Reads the identity from the validated token, then answers with the
/// stored record so role changes made after the token was minted (an
/// approved request, say) are visible immediately.
pub async fn whoami(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .store
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("This account no longer exists"))?;

    Ok(Json(json!({
        "success": true,
        "data": { "user": user }
    })))
}
