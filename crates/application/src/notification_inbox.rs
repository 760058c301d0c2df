//! Bulk read-state transition over a user's notifications.

use std::sync::Arc;

use crewline_core::AppResult;
use crewline_domain::UserId;

use crate::NotificationRepository;

/// Application service for the mark-all-read inbox action.
#[derive(Clone)]
pub struct NotificationInbox {
    repository: Arc<dyn NotificationRepository>,
}

impl NotificationInbox {
    /// Creates a new inbox service.
    #[must_use]
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    /// Marks every unread notification owned by the user as read.
    ///
    /// One atomic bulk update; returns the number of rows changed, so an
    /// immediate repeat call returns 0. Concurrent calls are harmless: rows
    /// only ever move from unread to read.
    pub async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        self.repository.mark_all_read(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crewline_domain::{NewNotification, UserId};

    use super::NotificationInbox;
    use crate::notification_service::NotificationRepository;
    use crate::notification_service::tests::InMemoryNotificationRepository;

    async fn seed_unread(repository: &InMemoryNotificationRepository, user_id: UserId, count: usize) {
        for index in 0..count {
            let inserted = repository
                .insert(NewNotification {
                    user_id,
                    kind: "comment_added".to_owned(),
                    title: format!("Comment {index}"),
                    message: "A card received a comment".to_owned(),
                    data: None,
                })
                .await;
            assert!(inserted.is_ok());
        }
    }

    #[tokio::test]
    async fn marks_all_unread_and_is_idempotent() {
        let repository = Arc::new(InMemoryNotificationRepository::default());
        let user = UserId::new();
        seed_unread(&repository, user, 3).await;

        let inbox = NotificationInbox::new(repository.clone());

        let first = inbox.mark_all_read(user).await;
        assert_eq!(first.unwrap_or(0), 3);

        let second = inbox.mark_all_read(user).await;
        assert_eq!(second.unwrap_or(99), 0);

        let records = repository.records.lock().await;
        assert!(records.iter().all(|record| record.read));
    }

    #[tokio::test]
    async fn only_touches_the_callers_notifications() {
        let repository = Arc::new(InMemoryNotificationRepository::default());
        let caller = UserId::new();
        let other = UserId::new();
        seed_unread(&repository, caller, 2).await;
        seed_unread(&repository, other, 1).await;

        let inbox = NotificationInbox::new(repository.clone());
        let changed = inbox.mark_all_read(caller).await;
        assert_eq!(changed.unwrap_or(0), 2);

        let records = repository.records.lock().await;
        let other_unread = records
            .iter()
            .filter(|record| record.user_id == other && !record.read)
            .count();
        assert_eq!(other_unread, 1);
    }
}
