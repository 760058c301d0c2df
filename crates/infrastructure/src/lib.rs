//! Infrastructure adapters: PostgreSQL repositories and chat dispatchers.

#![forbid(unsafe_code)]

mod console_direct_message_dispatcher;
mod postgres_notification_repository;
mod postgres_project_repository;
mod postgres_user_directory;
mod slack_direct_message_dispatcher;

pub use console_direct_message_dispatcher::ConsoleDirectMessageDispatcher;
pub use postgres_notification_repository::PostgresNotificationRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_user_directory::PostgresUserDirectory;
pub use slack_direct_message_dispatcher::{SlackDirectMessageDispatcher, SlackDispatcherConfig};
