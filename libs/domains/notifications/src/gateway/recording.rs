//! In-process gateway that captures sent notifications, for tests.

use super::NotificationGateway;
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records every send. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose sends always fail with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sleep before every send
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Poll until at least `count` notifications were recorded or `within` elapses.
    /// Returns whether the count was reached.
    pub async fn wait_for_count(&self, count: usize, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            if self.sent_count().await >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, to: &str, subject: &str, body: &str) -> NotificationResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(NotificationError::Gateway(message.clone()));
        }

        self.sent.lock().await.push(SentNotification {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
