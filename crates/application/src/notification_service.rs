//! Notification persistence and best-effort chat forwarding.
//!
//! The primary write goes through the repository port and is fatal on
//! failure. The optional direct-message forward runs strictly after a
//! successful write and sits behind an explicit error boundary: its result
//! is inspected, logged on failure, and discarded, so a slow or broken chat
//! channel never affects the durably recorded notification.

use std::sync::Arc;

use async_trait::async_trait;
use crewline_core::AppResult;
use crewline_domain::{NewNotification, Notification, NotificationId, UserId};
use tracing::warn;

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Repository port for notification persistence.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persists a new unread notification, assigning id and creation time.
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification>;

    /// Lists a user's notifications, newest first.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Notification>>;

    /// Marks a single notification owned by the user as read.
    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> AppResult<()>;

    /// Marks every unread notification owned by the user as read in one
    /// atomic update. Returns the number of rows changed.
    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64>;
}

/// Port for the external chat channel used for direct-message forwards.
#[async_trait]
pub trait DirectMessageDispatcher: Send + Sync {
    /// Returns whether the channel is configured. An unconfigured channel
    /// is a no-op skip, not an error.
    fn is_configured(&self) -> bool;

    /// Sends a direct message to the given channel-native recipient id.
    async fn send_direct_message(&self, recipient_id: &str, text: &str) -> AppResult<()>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service orchestrating notification writes and forwards.
#[derive(Clone)]
pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
    dispatcher: Arc<dyn DirectMessageDispatcher>,
}

impl NotificationService {
    /// Creates a new notification service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        dispatcher: Arc<dyn DirectMessageDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Persists a new unread notification and returns the stored record.
    ///
    /// A missing `data` payload is stored as an empty object. A failing
    /// store write surfaces to the caller unchanged.
    pub async fn create_notification(
        &self,
        mut params: NewNotification,
    ) -> AppResult<Notification> {
        params.data.get_or_insert_with(serde_json::Map::new);
        self.repository.insert(params).await
    }

    /// Persists a notification, then best-effort forwards its message as a
    /// direct message.
    ///
    /// The primary write must succeed or the whole call fails. The forward
    /// runs only when a recipient is present and the channel is configured;
    /// its failure is logged and discarded, and the already-persisted
    /// notification is returned regardless.
    pub async fn create_notification_with_dm(
        &self,
        params: NewNotification,
        dm_recipient: Option<&str>,
    ) -> AppResult<Notification> {
        let notification = self.create_notification(params).await?;

        if let Some(recipient) = dm_recipient
            && self.dispatcher.is_configured()
            && let Err(error) = self
                .dispatcher
                .send_direct_message(recipient, &notification.message)
                .await
        {
            warn!(
                %error,
                recipient,
                notification_id = %notification.id,
                "direct-message forward failed; notification remains persisted"
            );
        }

        Ok(notification)
    }

    /// Lists a user's notifications, newest first.
    pub async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
        self.repository.list_for_user(user_id).await
    }

    /// Marks a single notification owned by the user as read.
    pub async fn mark_read(&self, id: NotificationId, user_id: UserId) -> AppResult<()> {
        self.repository.mark_read(id, user_id).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use crewline_core::{AppError, AppResult};
    use crewline_domain::{NewNotification, Notification, NotificationId, UserId};
    use tokio::sync::Mutex;

    use super::{DirectMessageDispatcher, NotificationRepository, NotificationService};

    #[derive(Default)]
    pub(crate) struct InMemoryNotificationRepository {
        pub(crate) records: Mutex<Vec<Notification>>,
        pub(crate) fail_inserts: bool,
    }

    #[async_trait]
    impl NotificationRepository for InMemoryNotificationRepository {
        async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
            if self.fail_inserts {
                return Err(AppError::Internal("store unavailable".to_owned()));
            }

            let record = Notification {
                id: NotificationId::new(),
                user_id: notification.user_id,
                kind: notification.kind,
                title: notification.title,
                message: notification.message,
                data: notification.data.unwrap_or_default(),
                read: false,
                created_at: chrono::Utc::now(),
            };
            self.records.lock().await.push(record.clone());
            Ok(record)
        }

        async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Notification>> {
            let mut matching: Vec<Notification> = self
                .records
                .lock()
                .await
                .iter()
                .filter(|record| record.user_id == user_id)
                .cloned()
                .collect();
            matching.reverse();
            Ok(matching)
        }

        async fn mark_read(&self, id: NotificationId, user_id: UserId) -> AppResult<()> {
            let mut records = self.records.lock().await;
            let record = records
                .iter_mut()
                .find(|record| record.id == id && record.user_id == user_id)
                .ok_or_else(|| AppError::NotFound(format!("notification '{id}' not found")))?;
            record.read = true;
            Ok(())
        }

        async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
            let mut changed = 0;
            for record in self.records.lock().await.iter_mut() {
                if record.user_id == user_id && !record.read {
                    record.read = true;
                    changed += 1;
                }
            }
            Ok(changed)
        }
    }

    pub(crate) struct FakeDispatcher {
        pub(crate) configured: bool,
        pub(crate) fail_sends: bool,
        pub(crate) sent: AtomicUsize,
    }

    impl FakeDispatcher {
        pub(crate) fn healthy() -> Self {
            Self {
                configured: true,
                fail_sends: false,
                sent: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                configured: true,
                fail_sends: true,
                sent: AtomicUsize::new(0),
            }
        }

        pub(crate) fn unconfigured() -> Self {
            Self {
                configured: false,
                fail_sends: false,
                sent: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DirectMessageDispatcher for FakeDispatcher {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn send_direct_message(&self, _recipient_id: &str, _text: &str) -> AppResult<()> {
            if self.fail_sends {
                return Err(AppError::Internal("chat channel unreachable".to_owned()));
            }

            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn params_for(user_id: UserId) -> NewNotification {
        NewNotification {
            user_id,
            kind: "card_assigned".to_owned(),
            title: "Card assigned".to_owned(),
            message: "You were assigned a card".to_owned(),
            data: None,
        }
    }

    #[tokio::test]
    async fn create_stores_unread_record_with_empty_data_default() {
        let repository = Arc::new(InMemoryNotificationRepository::default());
        let service =
            NotificationService::new(repository.clone(), Arc::new(FakeDispatcher::healthy()));
        let user = UserId::new();

        let created = service.create_notification(params_for(user)).await;
        assert!(created.is_ok());

        let records = repository.records.lock().await;
        assert_eq!(records.len(), 1);
        assert!(!records[0].read);
        assert!(records[0].data.is_empty());
    }

    #[tokio::test]
    async fn store_failure_propagates_to_caller() {
        let repository = Arc::new(InMemoryNotificationRepository {
            fail_inserts: true,
            ..InMemoryNotificationRepository::default()
        });
        let service = NotificationService::new(repository, Arc::new(FakeDispatcher::healthy()));

        let created = service.create_notification(params_for(UserId::new())).await;
        assert!(matches!(created, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn failing_forward_still_returns_persisted_record() {
        let repository = Arc::new(InMemoryNotificationRepository::default());
        let service =
            NotificationService::new(repository.clone(), Arc::new(FakeDispatcher::failing()));
        let user = UserId::new();

        let created = service
            .create_notification_with_dm(params_for(user), Some("U123"))
            .await;
        assert!(created.is_ok());
        let created = created.unwrap_or_else(|_| panic!("test"));

        // The record is retrievable afterwards under its assigned id.
        let listed = service.list_for_user(user).await.unwrap_or_default();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn unconfigured_channel_skips_forward() {
        let dispatcher = Arc::new(FakeDispatcher::unconfigured());
        let service = NotificationService::new(
            Arc::new(InMemoryNotificationRepository::default()),
            dispatcher.clone(),
        );

        let created = service
            .create_notification_with_dm(params_for(UserId::new()), Some("U123"))
            .await;
        assert!(created.is_ok());
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_recipient_skips_forward() {
        let dispatcher = Arc::new(FakeDispatcher::healthy());
        let service = NotificationService::new(
            Arc::new(InMemoryNotificationRepository::default()),
            dispatcher.clone(),
        );

        let created = service
            .create_notification_with_dm(params_for(UserId::new()), None)
            .await;
        assert!(created.is_ok());
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn present_recipient_and_configured_channel_forwards_once() {
        let dispatcher = Arc::new(FakeDispatcher::healthy());
        let service = NotificationService::new(
            Arc::new(InMemoryNotificationRepository::default()),
            dispatcher.clone(),
        );

        let created = service
            .create_notification_with_dm(params_for(UserId::new()), Some("U123"))
            .await;
        assert!(created.is_ok());
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 1);
    }
}
