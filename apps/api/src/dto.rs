use crewline_application::UserAccount;
use crewline_domain::{Notification, ResolvedApprover};
use serde::{Deserialize, Serialize};

/// API representation of the authenticated user.
#[derive(Debug, Serialize)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub permission: String,
}

/// API representation of a notification record.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id.to_string(),
            kind: value.kind,
            title: value.title,
            message: value.message,
            data: value.data,
            read: value.read,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Result of the bulk mark-all-read action.
#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub marked_read: u64,
}

/// API representation of a resolved approver.
#[derive(Debug, Serialize)]
pub struct ResolvedApproverResponse {
    pub role: String,
    pub user_id: String,
    pub role_name: String,
}

impl From<ResolvedApprover> for ResolvedApproverResponse {
    fn from(value: ResolvedApprover) -> Self {
        Self {
            role: value.role.as_str().to_owned(),
            user_id: value.user_id.to_string(),
            role_name: value.role_name,
        }
    }
}

/// API representation of a user account in administrative views.
#[derive(Debug, Serialize)]
pub struct UserAccountResponse {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub permission: String,
    pub chat_recipient_id: Option<String>,
}

impl From<UserAccount> for UserAccountResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            id: value.id.to_string(),
            display_name: value.display_name,
            email: value.email,
            permission: value.permission.as_str().to_owned(),
            chat_recipient_id: value.chat_recipient_id,
        }
    }
}

/// Incoming payload for administrative permission changes.
#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    pub permission: String,
}
