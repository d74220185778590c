use serde::{Deserialize, Serialize};

use crate::database::models::{ApprovalStatus, Role, User};

/// The two reviewer actions an emailed link can carry. The action name is
/// part of the signed message, so an approve signature can never be
/// replayed against the reject endpoint or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalAction::Approve => "approve",
            ApprovalAction::Reject => "reject",
        }
    }

    /// Role the subject ends up with when this action is applied.
    pub fn target_role(&self) -> Role {
        match self {
            ApprovalAction::Approve => Role::Admin,
            ApprovalAction::Reject => Role::Student,
        }
    }

    pub fn target_status(&self) -> ApprovalStatus {
        match self {
            ApprovalAction::Approve => ApprovalStatus::Approved,
            ApprovalAction::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Closed set of user-facing outcomes of an action-link click. Rendering
/// (HTML, status codes) lives in `pages`; this is the protocol result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Role transitioned to Admin, request approved.
    Approved,
    /// Request rejected, role stays Student.
    Rejected,
    /// `exp` or `sig` query parameter missing or unreadable.
    MissingParams,
    /// The link's expiry has passed. No grace period.
    LinkExpired,
    /// Signature did not verify. Reported identically to a malformed
    /// request so a forger learns nothing about which field was wrong.
    InvalidSignature,
    /// Subject was deleted between issuance and click.
    UserNotFound,
    /// Approve clicked for a user who is already an Admin.
    AlreadyAdmin,
    /// The subject is the Prime Admin, which this flow never touches.
    PrimeAdminImmune,
    /// The request was already reviewed (second click, opposite link, or
    /// a lost race). An expected outcome, not an error.
    NoPendingRequest,
}

/// A link is usable strictly before its expiry instant; `now > exp`
/// rejects, with no grace period.
pub fn is_expired(expires_at_ms: i64, now_ms: i64) -> bool {
    now_ms > expires_at_ms
}

/// State gate for a verified, unexpired link: decides whether the
/// transition may proceed or which short-circuit outcome applies.
///
/// The "already the target role" check only exists for approve. Reject's
/// target role (Student) is also the role a pending requester holds, so
/// the symmetric check would turn every reject into a no-op; staleness on
/// the reject path is caught by the status check instead.
pub fn review_gate(user: &User, action: ApprovalAction) -> Result<(), ActionOutcome> {
    if user.role == Role::PrimeAdmin {
        return Err(ActionOutcome::PrimeAdminImmune);
    }
    if action == ApprovalAction::Approve && user.role == Role::Admin {
        return Err(ActionOutcome::AlreadyAdmin);
    }
    if user.has_pending_admin_request() {
        Ok(())
    } else {
        Err(ActionOutcome::NoPendingRequest)
    }
}

/// Outcome reported when the conditional update succeeds.
pub fn applied_outcome(action: ApprovalAction) -> ActionOutcome {
    match action {
        ApprovalAction::Approve => ActionOutcome::Approved,
        ApprovalAction::Reject => ActionOutcome::Rejected,
    }
}
