use std::sync::Arc;

use crewline_application::{
    AccessService, NotificationInbox, NotificationService, ReviewService, UserAdminService,
    UserDirectory,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub notification_service: NotificationService,
    pub notification_inbox: NotificationInbox,
    pub review_service: ReviewService,
    pub user_admin_service: UserAdminService,
    pub user_directory: Arc<dyn UserDirectory>,
    pub postgres_pool: PgPool,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub bootstrap_super_admin_email: Option<String>,
}
