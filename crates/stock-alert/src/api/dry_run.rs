//! Notifier that logs instead of sending

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::provider::Notifier;

/// Writes the alert body to the log. Used by `--dry-run`.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, body: &str) -> Result<()> {
        info!(body, "dry run, message not sent");
        Ok(())
    }
}
