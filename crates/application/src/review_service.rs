//! Review-request workflow: approver resolution plus notification fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use crewline_core::{AppError, AppResult, ProjectId};
use crewline_domain::{NewNotification, ResolvedApprover, RoleAssignment, resolve_approvers};
use serde_json::Value;

use crate::{NotificationService, UserDirectory};

/// Repository port for project configuration reads.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Returns the project's display name, if the project exists.
    async fn find_name(&self, project_id: ProjectId) -> AppResult<Option<String>>;

    /// Returns the project's role assignments in their configured order.
    async fn list_role_assignments(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<RoleAssignment>>;
}

/// Application service driving the review-request workflow.
///
/// Resolves a project's PO/LEAD approvers from its role assignments and
/// notifies each one: a durable in-app notification plus a best-effort
/// direct message when the approver has a chat recipient linked.
#[derive(Clone)]
pub struct ReviewService {
    projects: Arc<dyn ProjectRepository>,
    directory: Arc<dyn UserDirectory>,
    notifications: NotificationService,
}

impl ReviewService {
    /// Creates a new review service.
    #[must_use]
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        directory: Arc<dyn UserDirectory>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            projects,
            directory,
            notifications,
        }
    }

    /// Requests a review for a project on behalf of the named requester.
    ///
    /// Returns the resolved approvers in resolution order. A chat-channel
    /// failure never fails the request; a store failure does.
    pub async fn request_review(
        &self,
        requested_by: &str,
        project_id: ProjectId,
    ) -> AppResult<Vec<ResolvedApprover>> {
        let project_name = self
            .projects
            .find_name(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' not found")))?;

        let assignments = self.projects.list_role_assignments(project_id).await?;
        let approvers = resolve_approvers(&assignments);

        for approver in &approvers {
            let account = self.directory.find_by_id(approver.user_id).await?;
            let dm_recipient = account
                .as_ref()
                .and_then(|account| account.chat_recipient_id.as_deref());

            let mut data = serde_json::Map::new();
            data.insert(
                "project_id".to_owned(),
                Value::String(project_id.to_string()),
            );
            data.insert(
                "approver_role".to_owned(),
                Value::String(approver.role.as_str().to_owned()),
            );

            self.notifications
                .create_notification_with_dm(
                    NewNotification {
                        user_id: approver.user_id,
                        kind: "review_requested".to_owned(),
                        title: format!("Review requested: {project_name}"),
                        message: format!(
                            "{requested_by} requested your review of {project_name}"
                        ),
                        data: Some(data),
                    },
                    dm_recipient,
                )
                .await?;
        }

        Ok(approvers)
    }
}
