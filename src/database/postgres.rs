use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::approval::ApprovalAction;
use crate::database::models::{AdminRequest, ApprovalStatus, Role, User};
use crate::database::store::{StoreError, UserStore};

const SELECT_COLUMNS: &str = "id, name, email, password_hash, role, admin_status, \
     admin_requested_at, admin_reviewed_at, admin_reviewed_by, created_at, updated_at";

/// Postgres-backed user store. The admin request sub-record is flattened
/// into nullable columns; an absent `admin_status` is the "never
/// requested" state.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!("Created database pool");
        Ok(Self { pool })
    }

    /// Bring the schema up at startup. Idempotent.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                admin_status TEXT,
                admin_requested_at TIMESTAMPTZ,
                admin_reviewed_at TIMESTAMPTZ,
                admin_reviewed_by UUID,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    admin_status: Option<String>,
    admin_requested_at: Option<DateTime<Utc>>,
    admin_reviewed_at: Option<DateTime<Utc>>,
    admin_reviewed_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::Decode(format!("unknown role {:?}", row.role)))?;

        let admin_request = match row.admin_status {
            None => None,
            Some(status) => {
                let status = ApprovalStatus::parse(&status).ok_or_else(|| {
                    StoreError::Decode(format!("unknown admin_status {:?}", status))
                })?;
                let requested_at = row.admin_requested_at.ok_or_else(|| {
                    StoreError::Decode(format!("user {} has a status but no requested_at", row.id))
                })?;
                Some(AdminRequest {
                    status,
                    requested_at,
                    reviewed_at: row.admin_reviewed_at,
                    reviewed_by: row.admin_reviewed_by,
                })
            }
        };

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            admin_request,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, StoreError> {
    rows.into_iter().map(User::try_from).collect()
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let req = user.admin_request.as_ref();
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, admin_status, \
             admin_requested_at, admin_reviewed_at, admin_reviewed_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(req.map(|r| r.status.as_str()))
        .bind(req.map(|r| r.requested_at))
        .bind(req.and_then(|r| r.reviewed_at))
        .bind(req.and_then(|r| r.reviewed_by))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(StoreError::EmailTaken(user.email.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_pending_requests(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users \
             WHERE admin_status = 'pending' ORDER BY admin_requested_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows_to_users(rows)
    }

    async fn resolve_admin_request(
        &self,
        id: Uuid,
        action: ApprovalAction,
        reviewed_by: Option<Uuid>,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        // Compare-and-swap: the WHERE clause is the pending check, so a
        // concurrent reviewer cannot apply a second transition.
        let result = sqlx::query(
            "UPDATE users SET role = $2, admin_status = $3, admin_reviewed_at = $4, \
             admin_reviewed_by = $5, updated_at = $4 \
             WHERE id = $1 AND admin_status = 'pending'",
        )
        .bind(id)
        .bind(action.target_role().as_str())
        .bind(action.target_status().as_str())
        .bind(reviewed_at)
        .bind(reviewed_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
