//! PostgreSQL-backed notification store.

use async_trait::async_trait;
use sqlx::PgPool;

use crewline_application::NotificationRepository;
use crewline_core::{AppError, AppResult};
use crewline_domain::{NewNotification, Notification, NotificationId, UserId};

/// PostgreSQL implementation of the notification repository port.
#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    kind: String,
    title: String,
    message: String,
    data: serde_json::Value,
    read: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            kind: row.kind,
            title: row.title,
            message: row.message,
            data: row.data.as_object().cloned().unwrap_or_default(),
            read: row.read,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        let data = serde_json::Value::Object(notification.data.unwrap_or_default());

        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, kind, title, message, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, kind, title, message, data, read, created_at
            "#,
        )
        .bind(notification.user_id.as_uuid())
        .bind(notification.kind)
        .bind(notification.title)
        .bind(notification.message)
        .bind(data)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert notification: {error}")))?;

        Ok(Notification::from(row))
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, kind, title, message, data, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list notifications: {error}")))?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to mark notification read: {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("notification '{id}' not found")));
        }

        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        // Single statement; the predicate is self-consistent under
        // concurrent execution, so duplicate calls are harmless.
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE user_id = $1 AND read = FALSE
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to mark notifications read: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}
