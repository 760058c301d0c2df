//! PostgreSQL-backed user directory.

use async_trait::async_trait;
use sqlx::PgPool;

use crewline_application::{UserAccount, UserDirectory};
use crewline_core::{AppError, AppResult};
use crewline_domain::{PermissionTier, UserId};

/// PostgreSQL implementation of the user directory port.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserAccountRow {
    id: uuid::Uuid,
    display_name: String,
    email: String,
    permission: String,
    chat_recipient_id: Option<String>,
}

impl From<UserAccountRow> for UserAccount {
    fn from(row: UserAccountRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            display_name: row.display_name,
            email: row.email,
            // Stored tier text decodes fail-closed to the lowest tier.
            permission: PermissionTier::from_storage(&row.permission),
            chat_recipient_id: row.chat_recipient_id,
        }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserAccountRow>(
            r#"
            SELECT id, display_name, email, permission, chat_recipient_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        Ok(row.map(UserAccount::from))
    }

    async fn list(&self) -> AppResult<Vec<UserAccount>> {
        let rows = sqlx::query_as::<_, UserAccountRow>(
            r#"
            SELECT id, display_name, email, permission, chat_recipient_id
            FROM users
            ORDER BY display_name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        Ok(rows.into_iter().map(UserAccount::from).collect())
    }

    async fn ensure_account(&self, email: &str, display_name: &str) -> AppResult<UserAccount> {
        let row = sqlx::query_as::<_, UserAccountRow>(
            r#"
            INSERT INTO users (email, display_name)
            VALUES (LOWER($1), $2)
            ON CONFLICT (email) DO UPDATE SET display_name = EXCLUDED.display_name
            RETURNING id, display_name, email, permission, chat_recipient_id
            "#,
        )
        .bind(email)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to ensure account: {error}")))?;

        Ok(UserAccount::from(row))
    }

    async fn update_permission(&self, user_id: UserId, tier: PermissionTier) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET permission = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(tier.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update permission: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        }

        Ok(())
    }
}
