use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::approval::ApprovalAction;
use crate::database::models::{ApprovalStatus, User};
use crate::database::store::{StoreError, UserStore};

/// In-memory user store. Backs the test suite and the development server
/// when no `DATABASE_URL` is configured; everything is lost on restart.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing registration. Test seam for
    /// fixtures such as a Prime Admin account.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken(user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_pending_requests(&self) -> Result<Vec<User>, StoreError> {
        let mut pending: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.has_pending_admin_request())
            .cloned()
            .collect();
        pending.sort_by_key(|u| {
            u.admin_request
                .as_ref()
                .map(|r| r.requested_at)
                .unwrap_or(u.created_at)
        });
        Ok(pending)
    }

    async fn resolve_admin_request(
        &self,
        id: Uuid,
        action: ApprovalAction,
        reviewed_by: Option<Uuid>,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        // Single write-lock section: the pending check and the mutation
        // are atomic with respect to other callers.
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };
        match user.admin_request.as_mut() {
            Some(req) if req.status == ApprovalStatus::Pending => {
                req.status = action.target_status();
                req.reviewed_at = Some(reviewed_at);
                req.reviewed_by = reviewed_by;
                user.role = action.target_role();
                user.updated_at = reviewed_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{AdminRequest, Role};

    fn pending_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Riley".to_string(),
            email: "riley@campus.edu".to_string(),
            password_hash: String::new(),
            role: Role::Student,
            admin_request: Some(AdminRequest::pending(now)),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn resolve_applies_exactly_once() {
        let store = MemoryUserStore::new();
        let user = pending_user();
        let id = user.id;
        store.create_user(&user).await.unwrap();

        let first = store
            .resolve_admin_request(id, ApprovalAction::Approve, None, Utc::now())
            .await
            .unwrap();
        assert!(first);

        // Second attempt (same or opposite action) loses the swap.
        let second = store
            .resolve_admin_request(id, ApprovalAction::Reject, None, Utc::now())
            .await
            .unwrap();
        assert!(!second);

        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Admin);
        assert_eq!(
            stored.admin_request.unwrap().status,
            ApprovalStatus::Approved
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::new();
        let user = pending_user();
        store.create_user(&user).await.unwrap();

        let mut dup = pending_user();
        dup.id = Uuid::new_v4();
        assert!(matches!(
            store.create_user(&dup).await,
            Err(StoreError::EmailTaken(_))
        ));
    }
}
