//! Notification gateway implementations.
//!
//! This module contains the `NotificationGateway` trait and implementations
//! for the ways a message can leave the service.

mod logging;
mod recording;
mod smtp;

pub use logging::LoggingGateway;
pub use recording::{RecordingGateway, SentNotification};
pub use smtp::SmtpGateway;

use crate::config::NotificationConfig;
use crate::error::NotificationResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends a plain-text message to one recipient.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> NotificationResult<()>;

    /// Gateway name for logging.
    fn name(&self) -> &'static str;
}

/// SMTP when configured, otherwise messages only go to the log
pub fn gateway_from_config(config: &NotificationConfig) -> NotificationResult<Arc<dyn NotificationGateway>> {
    match &config.smtp {
        Some(smtp) => Ok(Arc::new(SmtpGateway::new(smtp.clone())?)),
        None => {
            tracing::warn!("SMTP_HOST not set, notifications will only be logged");
            Ok(Arc::new(LoggingGateway))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpConfig;

    #[test]
    fn test_gateway_selection() {
        let logging = gateway_from_config(&NotificationConfig::default()).unwrap();
        assert_eq!(logging.name(), "logging");
    }

    #[tokio::test]
    async fn test_smtp_gateway_selected_when_configured() {
        let config = NotificationConfig {
            smtp: Some(SmtpConfig::new("localhost", 1025, "noreply@localhost")),
            ..Default::default()
        };
        let gateway = gateway_from_config(&config).unwrap();
        assert_eq!(gateway.name(), "smtp");
    }
}
