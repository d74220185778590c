use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::approval::action::{applied_outcome, is_expired, review_gate, ActionOutcome, ApprovalAction};
use crate::approval::pages;
use crate::approval::signature::{signing_message, verify};
use crate::database::store::StoreError;
use crate::state::AppState;

/// Query half of an action link. Both fields are kept optional so their
/// absence is answered with the "missing parameters" page instead of an
/// axum rejection.
#[derive(Debug, Deserialize)]
pub struct ActionParams {
    exp: Option<String>,
    sig: Option<String>,
}

/// GET /api/admin/email/approve/:user_id?exp=..&sig=..
///
/// Unauthenticated by design: the signature in the link is the
/// credential. Every outcome answers with a human-facing HTML page.
pub async fn approve(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<ActionParams>,
) -> Response {
    handle(state, user_id, ApprovalAction::Approve, params).await
}

/// GET /api/admin/email/reject/:user_id?exp=..&sig=..
pub async fn reject(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<ActionParams>,
) -> Response {
    handle(state, user_id, ApprovalAction::Reject, params).await
}

async fn handle(
    state: AppState,
    subject: Uuid,
    action: ApprovalAction,
    params: ActionParams,
) -> Response {
    match run(&state, subject, action, &params).await {
        Ok(outcome) => {
            info!(
                subject = %subject,
                action = action.as_str(),
                outcome = ?outcome,
                "Handled admin action link"
            );
            pages::outcome_page(outcome).into_response()
        }
        Err(e) => {
            error!(subject = %subject, error = %e, "Store failure while handling action link");
            pages::service_error_page().into_response()
        }
    }
}

/// The validation sequence, fail fast, in order: parameter presence,
/// expiry, signature, subject existence, state gate, then the
/// conditional update. Exactly one role mutation happens on success and
/// none on any rejection path.
async fn run(
    state: &AppState,
    subject: Uuid,
    action: ApprovalAction,
    params: &ActionParams,
) -> Result<ActionOutcome, StoreError> {
    let (Some(exp_raw), Some(sig)) = (params.exp.as_deref(), params.sig.as_deref()) else {
        return Ok(ActionOutcome::MissingParams);
    };
    let Ok(expires_at_ms) = exp_raw.parse::<i64>() else {
        return Ok(ActionOutcome::MissingParams);
    };

    let now = Utc::now();
    if is_expired(expires_at_ms, now.timestamp_millis()) {
        return Ok(ActionOutcome::LinkExpired);
    }

    // The action name is inside the signed message, so checking the
    // signature also checks that this link was minted for this endpoint.
    let message = signing_message(&subject, action, expires_at_ms);
    let secret = state.config.approval.signing_secret.as_bytes();
    if !verify(&message, secret, sig) {
        return Ok(ActionOutcome::InvalidSignature);
    }

    let Some(user) = state.store.find_by_id(subject).await? else {
        return Ok(ActionOutcome::UserNotFound);
    };
    if let Err(short_circuit) = review_gate(&user, action) {
        return Ok(short_circuit);
    }

    // Conditional update: applies only while the request is still
    // pending, so a concurrent opposite click loses the swap and lands
    // on the same page as a second click.
    let applied = state
        .store
        .resolve_admin_request(subject, action, None, now)
        .await?;
    Ok(if applied {
        applied_outcome(action)
    } else {
        ActionOutcome::NoPendingRequest
    })
}
