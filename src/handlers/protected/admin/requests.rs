use axum::extract::{Extension, Path, State};
use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::approval::action::{review_gate, ActionOutcome, ApprovalAction};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/admin/requests - Pending admin-role requests, oldest first
///
/// The authenticated review path. Also the fallback when the emailed
/// links were never delivered or have expired.
///
/// Expected Output:
/// ```json
/// { "success": true, "data": { "requests": [ { "id": "uuid", ... } ] } }
/// ```
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let pending = state.store.list_pending_requests().await?;
    Ok(Json(json!({
        "success": true,
        "data": { "requests": pending }
    })))
}

/// POST /api/admin/requests/:user_id/approve
pub async fn approve(
    State(state): State<AppState>,
    Extension(reviewer): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    review(state, reviewer, user_id, ApprovalAction::Approve).await
}

/// POST /api/admin/requests/:user_id/reject
pub async fn reject(
    State(state): State<AppState>,
    Extension(reviewer): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    review(state, reviewer, user_id, ApprovalAction::Reject).await
}

/// Same state machine and conditional update as the email path. The one
/// difference: `reviewed_by` records the reviewer here, while the email
/// path leaves it unset.
async fn review(
    state: AppState,
    reviewer: AuthUser,
    user_id: Uuid,
    action: ApprovalAction,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    review_gate(&user, action).map_err(gate_error)?;

    let applied = state
        .store
        .resolve_admin_request(user_id, action, Some(reviewer.id), Utc::now())
        .await?;
    if !applied {
        return Err(ApiError::conflict("No pending admin request to review"));
    }

    tracing::info!(
        subject = %user_id,
        reviewer = %reviewer.id,
        action = action.as_str(),
        "Admin request reviewed from the dashboard"
    );

    let updated = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(json!({
        "success": true,
        "data": { "user": updated }
    })))
}

fn gate_error(outcome: ActionOutcome) -> ApiError {
    match outcome {
        ActionOutcome::PrimeAdminImmune => {
            ApiError::forbidden("The Prime Admin account cannot be modified")
        }
        ActionOutcome::AlreadyAdmin => ApiError::conflict("This user is already an Admin"),
        _ => ApiError::conflict("No pending admin request to review"),
    }
}
