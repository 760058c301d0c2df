//! Application services and ports.

#![forbid(unsafe_code)]

mod access_service;
mod notification_inbox;
mod notification_service;
mod review_service;
mod user_admin_service;

pub use access_service::{AccessService, UserAccount, UserDirectory};
pub use notification_inbox::NotificationInbox;
pub use notification_service::{
    DirectMessageDispatcher, NotificationRepository, NotificationService,
};
pub use review_service::{ProjectRepository, ReviewService};
pub use user_admin_service::UserAdminService;
