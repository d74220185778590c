use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::approval::ApprovalAction;
use crate::database::models::User;

/// Errors from user-store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Invalid stored record: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence seam for user records.
///
/// The review transition is deliberately a single conditional update
/// (`resolve_admin_request`) rather than separate read and write calls:
/// the store applies it only while the request is still pending, so two
/// concurrent clicks can never both take effect. The loser of a race
/// observes `false` and reports the same outcome as a second click.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Users whose admin-role request is still pending, oldest first.
    async fn list_pending_requests(&self) -> Result<Vec<User>, StoreError>;

    /// Apply a review decision if and only if the subject's request is
    /// still pending: sets role, status and `reviewed_at` together.
    /// Returns `false` when the request was not pending (already
    /// reviewed, never requested, or the user vanished).
    ///
    /// `reviewed_by` is `None` for the emailed-link path and the
    /// reviewer's id for the authenticated dashboard path.
    async fn resolve_admin_request(
        &self,
        id: Uuid,
        action: ApprovalAction,
        reviewed_by: Option<Uuid>,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn health(&self) -> Result<(), StoreError>;
}
