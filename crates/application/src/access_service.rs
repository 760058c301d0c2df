//! Permission-tier checks over the user directory.
//!
//! Every administrative surface calls through here before acting. Tier
//! decoding is fail-closed: a missing account or an unknown stored value
//! resolves to the lowest tier, never to an error that widens access.

use std::sync::Arc;

use async_trait::async_trait;
use crewline_core::{AppError, AppResult};
use crewline_domain::{PermissionTier, UserId};

/// User projection returned by directory lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name shown across the product.
    pub display_name: String,
    /// Canonical email address.
    pub email: String,
    /// Decoded permission tier.
    pub permission: PermissionTier,
    /// Chat-channel recipient id for direct-message forwards, if linked.
    pub chat_recipient_id: Option<String>,
}

/// Repository port for user lookups and the administrative permission write.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by their unique identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserAccount>>;

    /// Lists all user accounts.
    async fn list(&self) -> AppResult<Vec<UserAccount>>;

    /// Finds or creates the account for an email, updating the display name.
    async fn ensure_account(&self, email: &str, display_name: &str) -> AppResult<UserAccount>;

    /// Updates the stored permission tier for a user.
    async fn update_permission(&self, user_id: UserId, tier: PermissionTier) -> AppResult<()>;
}

/// Application service for permission-tier authorization checks.
#[derive(Clone)]
pub struct AccessService {
    directory: Arc<dyn UserDirectory>,
}

impl AccessService {
    /// Creates a new access service from a directory implementation.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Returns the acting user's current tier, lowest tier when unknown.
    pub async fn current_tier(&self, user_id: UserId) -> AppResult<PermissionTier> {
        Ok(self
            .directory
            .find_by_id(user_id)
            .await?
            .map(|account| account.permission)
            .unwrap_or(PermissionTier::User))
    }

    /// Ensures the acting user meets the required tier threshold.
    pub async fn require_tier(
        &self,
        user_id: UserId,
        threshold: PermissionTier,
    ) -> AppResult<()> {
        let tier = self.current_tier(user_id).await?;

        if tier.is_at_least(threshold) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' requires at least the '{}' tier",
            threshold.as_str()
        )))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use crewline_core::{AppError, AppResult};
    use crewline_domain::{PermissionTier, UserId};
    use tokio::sync::Mutex;

    use super::{AccessService, UserAccount, UserDirectory};

    #[derive(Default)]
    pub(crate) struct FakeUserDirectory {
        pub(crate) accounts: Mutex<HashMap<UserId, UserAccount>>,
    }

    impl FakeUserDirectory {
        pub(crate) async fn add(&self, tier: PermissionTier) -> UserId {
            let user_id = UserId::new();
            self.accounts.lock().await.insert(
                user_id,
                UserAccount {
                    id: user_id,
                    display_name: "Test User".to_owned(),
                    email: format!("{user_id}@example.com"),
                    permission: tier,
                    chat_recipient_id: None,
                },
            );
            user_id
        }
    }

    #[async_trait]
    impl UserDirectory for FakeUserDirectory {
        async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
            Ok(self.accounts.lock().await.get(&user_id).cloned())
        }

        async fn list(&self) -> AppResult<Vec<UserAccount>> {
            Ok(self.accounts.lock().await.values().cloned().collect())
        }

        async fn ensure_account(
            &self,
            email: &str,
            display_name: &str,
        ) -> AppResult<UserAccount> {
            let mut accounts = self.accounts.lock().await;
            if let Some(existing) = accounts.values().find(|account| account.email == email) {
                return Ok(existing.clone());
            }

            let account = UserAccount {
                id: UserId::new(),
                display_name: display_name.to_owned(),
                email: email.to_owned(),
                permission: PermissionTier::User,
                chat_recipient_id: None,
            };
            accounts.insert(account.id, account.clone());
            Ok(account)
        }

        async fn update_permission(
            &self,
            user_id: UserId,
            tier: PermissionTier,
        ) -> AppResult<()> {
            let mut accounts = self.accounts.lock().await;
            let account = accounts
                .get_mut(&user_id)
                .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))?;
            account.permission = tier;
            Ok(())
        }
    }

    #[tokio::test]
    async fn admin_passes_admin_threshold() {
        let directory = Arc::new(FakeUserDirectory::default());
        let admin = directory.add(PermissionTier::Admin).await;
        let service = AccessService::new(directory);

        let result = service.require_tier(admin, PermissionTier::Admin).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn super_admin_passes_admin_threshold() {
        let directory = Arc::new(FakeUserDirectory::default());
        let super_admin = directory.add(PermissionTier::SuperAdmin).await;
        let service = AccessService::new(directory);

        let result = service.require_tier(super_admin, PermissionTier::Admin).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn regular_user_is_rejected_from_admin_threshold() {
        let directory = Arc::new(FakeUserDirectory::default());
        let user = directory.add(PermissionTier::User).await;
        let service = AccessService::new(directory);

        let result = service.require_tier(user, PermissionTier::Admin).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn unknown_user_resolves_to_lowest_tier() {
        let service = AccessService::new(Arc::new(FakeUserDirectory::default()));

        let tier = service.current_tier(UserId::new()).await;
        assert!(tier.is_ok());
        assert_eq!(
            tier.unwrap_or(PermissionTier::SuperAdmin),
            PermissionTier::User
        );
    }
}
