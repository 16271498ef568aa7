use super::NotificationGateway;
use crate::error::NotificationResult;
use async_trait::async_trait;

/// Writes notifications to the log instead of delivering them.
/// Used when no SMTP relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingGateway;

#[async_trait]
impl NotificationGateway for LoggingGateway {
    async fn send(&self, to: &str, subject: &str, body: &str) -> NotificationResult<()> {
        tracing::info!(to = %to, subject = %subject, body = %body, "Notification (not delivered)");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "logging"
    }
}
