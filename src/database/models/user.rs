use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. `PrimeAdmin` is the single top-level administrator and
/// is never modifiable through the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Admin,
    PrimeAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
            Role::PrimeAdmin => "prime_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "admin" => Some(Role::Admin),
            "prime_admin" => Some(Role::PrimeAdmin),
            _ => None,
        }
    }
}

/// Review state of an admin-role request. "Never requested" is the
/// absence of the sub-record, not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

/// Audit sub-record tracking a user's role-elevation request. Created at
/// most once per registration and never deleted, only transitioned.
///
/// `reviewed_by` stays `None` when the review came through an emailed
/// action link rather than the authenticated dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRequest {
    pub status: ApprovalStatus,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

impl AdminRequest {
    pub fn pending(requested_at: DateTime<Utc>) -> Self {
        Self {
            status: ApprovalStatus::Pending,
            requested_at,
            reviewed_at: None,
            reviewed_by: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub admin_request: Option<AdminRequest>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// True while the account has an unreviewed admin-role request.
    pub fn has_pending_admin_request(&self) -> bool {
        matches!(
            &self.admin_request,
            Some(req) if req.status == ApprovalStatus::Pending
        )
    }
}
