//! SMTP gateway using lettre.
//!
//! Plaintext transport is meant for local development with Mailpit or
//! similar tools; set `SMTP_USE_TLS` for a real relay.

use super::NotificationGateway;
use crate::config::SmtpConfig;
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, error, info};

pub struct SmtpGateway {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    config: SmtpConfig,
}

impl SmtpGateway {
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| NotificationError::InvalidAddress(format!("{}: {}", config.from_email, e)))?;

        Ok(Self {
            transport: build_transport(&config)?,
            from,
            config,
        })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> NotificationResult<Message> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| NotificationError::InvalidAddress(format!("{}: {}", to, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotificationError::Gateway(format!("Failed to build email message: {}", e)))
    }
}

fn build_transport(config: &SmtpConfig) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
    let builder = if config.use_tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotificationError::Gateway(format!("Failed to create SMTP relay: {}", e)))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
    };
    let mut builder = builder.port(config.port);

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
    }

    Ok(builder.build())
}

#[async_trait]
impl NotificationGateway for SmtpGateway {
    async fn send(&self, to: &str, subject: &str, body: &str) -> NotificationResult<()> {
        debug!(
            to = %to,
            subject = %subject,
            host = %self.config.host,
            port = self.config.port,
            "Sending email via SMTP"
        );

        let message = self.build_message(to, subject, body)?;

        let response = self.transport.send(message).await.map_err(|e| {
            error!(to = %to, error = %e, "Failed to send email via SMTP");
            NotificationError::Gateway(format!("SMTP send failed: {}", e))
        })?;

        info!(
            to = %to,
            code = %response.code(),
            "Email sent via SMTP"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> SmtpGateway {
        SmtpGateway::new(SmtpConfig::new("localhost", 1025, "noreply@localhost")).unwrap()
    }

    #[test]
    fn test_rejects_invalid_sender() {
        let result = SmtpGateway::new(SmtpConfig::new("localhost", 1025, "not an address"));
        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_build_message_rejects_invalid_recipient() {
        let result = gateway().build_message("nobody", "Subject", "Body");
        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_build_message_is_plain_text() {
        let message = gateway()
            .build_message("owner@example.com", "Your product has been deleted", "Dear Ana")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Your product has been deleted"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("To: owner@example.com"));
    }
}
