use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::NotificationError;
use crate::gateway::NotificationGateway;
use crate::templates::Notification;

/// What happened to a dispatched notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
    TimedOut,
}

/// Fire-and-forget delivery. Each notification runs on its own task,
/// bounded by `timeout`; failures are logged and never reach the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    gateway: Arc<dyn NotificationGateway>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(gateway: Arc<dyn NotificationGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    /// Spawn delivery and return immediately. Must be called inside a Tokio runtime.
    /// The handle is only useful for tests and may be dropped.
    pub fn dispatch(&self, notification: Notification) -> JoinHandle<DeliveryOutcome> {
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.timeout;

        tokio::spawn(async move {
            let sending = gateway.send(&notification.to, &notification.subject, &notification.body);

            match tokio::time::timeout(timeout, sending).await {
                Ok(Ok(())) => {
                    tracing::debug!(to = %notification.to, gateway = gateway.name(), "Notification delivered");
                    DeliveryOutcome::Delivered
                }
                Ok(Err(error)) => {
                    tracing::warn!(to = %notification.to, gateway = gateway.name(), %error, "Notification failed");
                    DeliveryOutcome::Failed
                }
                Err(_) => {
                    let error = NotificationError::Timeout(timeout);
                    tracing::warn!(to = %notification.to, gateway = gateway.name(), %error, "Notification failed");
                    DeliveryOutcome::TimedOut
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RecordingGateway;
    use crate::templates::{RemovedBy, product_removed};

    fn dispatcher(gateway: RecordingGateway, timeout: Duration) -> NotificationDispatcher {
        NotificationDispatcher::new(Arc::new(gateway), timeout)
    }

    #[tokio::test]
    async fn test_delivers_through_gateway() {
        let gateway = RecordingGateway::new();
        let outcome = dispatcher(gateway.clone(), Duration::from_secs(1))
            .dispatch(product_removed("ana@example.com", "Ana", "Bike", RemovedBy::Admin))
            .await
            .unwrap();

        assert_eq!(outcome, DeliveryOutcome::Delivered);
        let sent = gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ana@example.com");
    }

    #[tokio::test]
    async fn test_gateway_failure_is_swallowed() {
        let outcome = dispatcher(RecordingGateway::failing("relay down"), Duration::from_secs(1))
            .dispatch(product_removed("ana@example.com", "Ana", "Bike", RemovedBy::Admin))
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_gateway_times_out() {
        let gateway = RecordingGateway::new().with_delay(Duration::from_secs(60));
        let outcome = dispatcher(gateway.clone(), Duration::from_secs(10))
            .dispatch(product_removed("ana@example.com", "Ana", "Bike", RemovedBy::Admin))
            .await
            .unwrap();

        assert_eq!(outcome, DeliveryOutcome::TimedOut);
        assert_eq!(gateway.sent_count().await, 0);
    }
}
