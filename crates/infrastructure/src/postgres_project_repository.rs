//! PostgreSQL-backed project configuration reads.

use async_trait::async_trait;
use sqlx::PgPool;

use crewline_application::ProjectRepository;
use crewline_core::{AppError, AppResult, ProjectId};
use crewline_domain::{RoleAssignment, UserId};

/// PostgreSQL implementation of the project repository port.
#[derive(Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleAssignmentRow {
    user_id: Option<uuid::Uuid>,
    role_name: Option<String>,
}

impl From<RoleAssignmentRow> for RoleAssignment {
    fn from(row: RoleAssignmentRow) -> Self {
        Self {
            user_id: row.user_id.map(UserId::from_uuid),
            role_name: row.role_name,
        }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn find_name(&self, project_id: ProjectId) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project: {error}")))
    }

    async fn list_role_assignments(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT user_id, role_name
            FROM project_roles
            WHERE project_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role assignments: {error}"))
        })?;

        Ok(rows.into_iter().map(RoleAssignment::from).collect())
    }
}
