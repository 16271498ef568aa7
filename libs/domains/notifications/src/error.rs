//! Error types for the notifications domain.

use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// The recipient or sender address could not be parsed.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The gateway refused or failed to deliver the message.
    #[error("Notification gateway error: {0}")]
    Gateway(String),

    /// Delivery did not finish within the configured bound.
    #[error("Notification timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Configuration error: {0}")]
    Config(#[from] core_config::ConfigError),
}
