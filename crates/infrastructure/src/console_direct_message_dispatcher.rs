//! Console chat dispatcher for development. Logs direct messages to
//! tracing output.

use async_trait::async_trait;
use crewline_application::DirectMessageDispatcher;
use crewline_core::AppResult;
use tracing::info;

/// Development dispatcher that logs direct messages to the console.
#[derive(Clone)]
pub struct ConsoleDirectMessageDispatcher;

impl ConsoleDirectMessageDispatcher {
    /// Creates a new console dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleDirectMessageDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectMessageDispatcher for ConsoleDirectMessageDispatcher {
    fn is_configured(&self) -> bool {
        true
    }

    async fn send_direct_message(&self, recipient_id: &str, text: &str) -> AppResult<()> {
        info!(
            recipient = recipient_id,
            "--- DIRECT MESSAGE (console) ---\nTo: {}\n\n{}\n--- END DIRECT MESSAGE ---",
            recipient_id,
            text
        );

        Ok(())
    }
}
