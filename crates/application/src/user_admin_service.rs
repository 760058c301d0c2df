//! Administrative user management.
//!
//! The only code path that mutates a user's permission tier. Listing is an
//! administrative view (ADMIN or above); changing tiers is a settings-level
//! action (SUPER_ADMIN only).

use std::sync::Arc;

use crewline_core::{AppError, AppResult};
use crewline_domain::{PermissionTier, UserId};

use crate::{AccessService, UserAccount, UserDirectory};

/// Application service for administrative user operations.
#[derive(Clone)]
pub struct UserAdminService {
    access: AccessService,
    directory: Arc<dyn UserDirectory>,
}

impl UserAdminService {
    /// Creates a new user administration service.
    #[must_use]
    pub fn new(access: AccessService, directory: Arc<dyn UserDirectory>) -> Self {
        Self { access, directory }
    }

    /// Lists all user accounts. Requires the ADMIN tier or above.
    pub async fn list_users(&self, actor: UserId) -> AppResult<Vec<UserAccount>> {
        self.access.require_tier(actor, PermissionTier::Admin).await?;
        self.directory.list().await
    }

    /// Sets a user's permission tier. Requires the SUPER_ADMIN tier.
    pub async fn set_permission(
        &self,
        actor: UserId,
        target: UserId,
        tier: PermissionTier,
    ) -> AppResult<()> {
        self.access
            .require_tier(actor, PermissionTier::SuperAdmin)
            .await?;

        self.directory
            .find_by_id(target)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{target}' not found")))?;

        self.directory.update_permission(target, tier).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crewline_core::AppError;
    use crewline_domain::{PermissionTier, UserId};

    use super::UserAdminService;
    use crate::AccessService;
    use crate::access_service::UserDirectory;
    use crate::access_service::tests::FakeUserDirectory;

    fn service_for(directory: Arc<FakeUserDirectory>) -> UserAdminService {
        UserAdminService::new(AccessService::new(directory.clone()), directory)
    }

    #[tokio::test]
    async fn admin_can_list_users() {
        let directory = Arc::new(FakeUserDirectory::default());
        let admin = directory.add(PermissionTier::Admin).await;
        directory.add(PermissionTier::User).await;

        let listed = service_for(directory).list_users(admin).await;
        assert!(listed.is_ok());
        assert_eq!(listed.unwrap_or_default().len(), 2);
    }

    #[tokio::test]
    async fn regular_user_cannot_list_users() {
        let directory = Arc::new(FakeUserDirectory::default());
        let user = directory.add(PermissionTier::User).await;

        let listed = service_for(directory).list_users(user).await;
        assert!(matches!(listed, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn super_admin_can_change_permission() {
        let directory = Arc::new(FakeUserDirectory::default());
        let super_admin = directory.add(PermissionTier::SuperAdmin).await;
        let target = directory.add(PermissionTier::User).await;

        let result = service_for(directory.clone())
            .set_permission(super_admin, target, PermissionTier::Admin)
            .await;
        assert!(result.is_ok());

        let updated = directory.find_by_id(target).await.unwrap_or_default();
        assert_eq!(
            updated.map(|account| account.permission),
            Some(PermissionTier::Admin)
        );
    }

    #[tokio::test]
    async fn admin_cannot_change_permission() {
        let directory = Arc::new(FakeUserDirectory::default());
        let admin = directory.add(PermissionTier::Admin).await;
        let target = directory.add(PermissionTier::User).await;

        let result = service_for(directory)
            .set_permission(admin, target, PermissionTier::Admin)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn changing_permission_of_unknown_user_is_not_found() {
        let directory = Arc::new(FakeUserDirectory::default());
        let super_admin = directory.add(PermissionTier::SuperAdmin).await;

        let result = service_for(directory)
            .set_permission(super_admin, UserId::new(), PermissionTier::Admin)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
