//! Notifications Domain
//!
//! Plain-text notifications to marketplace users. Delivery goes through a
//! [`NotificationGateway`]; the [`NotificationDispatcher`] sends in the
//! background with a bounded timeout so callers never wait on, or fail
//! because of, the mail relay.
//!
//! # Gateways
//!
//! - [`SmtpGateway`]: lettre over SMTP (Mailpit locally, STARTTLS relay in production)
//! - [`LoggingGateway`]: logs instead of sending when SMTP is not configured
//! - [`RecordingGateway`]: captures messages for tests
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{NotificationConfig, NotificationDispatcher, gateway_from_config, templates};
//!
//! let config = NotificationConfig::from_env()?;
//! let dispatcher = NotificationDispatcher::new(gateway_from_config(&config)?, config.timeout);
//! dispatcher.dispatch(templates::product_removed("ana@example.com", "Ana", "Bike", templates::RemovedBy::Admin));
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod templates;

pub use config::{NotificationConfig, SmtpConfig};
pub use dispatcher::{DeliveryOutcome, NotificationDispatcher};
pub use error::{NotificationError, NotificationResult};
pub use gateway::{
    LoggingGateway, NotificationGateway, RecordingGateway, SentNotification, SmtpGateway,
    gateway_from_config,
};
pub use templates::{Notification, RemovedBy};
