//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod approver;
mod notification;
mod user;

pub use approver::{
    ApproverRole, ResolvedApprover, RoleAssignment, normalize_role_name, resolve_approvers,
};
pub use notification::{NewNotification, Notification, NotificationId};
pub use user::{EmailAddress, PermissionTier, UserId};
