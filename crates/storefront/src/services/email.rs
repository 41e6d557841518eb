//! Outbound mail relay.
//!
//! Uses SMTP via lettre. Callers hand over an already rendered subject and
//! bodies; templating lives in [`super::notifications`].

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use fashion_store_core::Email;

use crate::config::{EmailConfig, SmtpEncryption};

const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Something that can deliver one multipart email.
#[async_trait]
pub trait MailRelay: Send + Sync {
    /// Make a single delivery attempt.
    async fn send(
        &self,
        subject: &str,
        recipient: &Email,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), EmailError>;
}

/// SMTP relay backed by a pooled lettre transport.
#[derive(Clone)]
pub struct SmtpRelay {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpRelay {
    /// Create a relay from configuration. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the host or sender address is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let builder = match config.encryption {
            SmtpEncryption::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            }
            SmtpEncryption::Implicit => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            }
        };

        let mailer = builder
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let from = config
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn send(
        &self,
        subject: &str,
        recipient: &Email,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), EmailError> {
        let to: Mailbox = recipient
            .as_str()
            .parse()
            .map_err(|_| EmailError::InvalidAddress(recipient.to_string()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;
        tracing::info!(subject, "email sent");
        Ok(())
    }
}

/// Relays for exercising notification paths without an SMTP server.
#[cfg(any(test, feature = "test-support"))]
pub mod testing {
    use std::sync::Mutex;

    use super::{Email, EmailError, MailRelay, async_trait};

    /// A message captured by [`RecordingRelay`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentMail {
        pub subject: String,
        pub recipient: String,
        pub html_body: String,
        pub text_body: String,
    }

    /// Accepts every message and keeps a copy.
    #[derive(Default)]
    pub struct RecordingRelay {
        sent: Mutex<Vec<SentMail>>,
    }

    impl RecordingRelay {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Messages accepted so far.
        #[must_use]
        pub fn sent(&self) -> Vec<SentMail> {
            self.sent
                .lock()
                .map(|sent| sent.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl MailRelay for RecordingRelay {
        async fn send(
            &self,
            subject: &str,
            recipient: &Email,
            html_body: &str,
            text_body: &str,
        ) -> Result<(), EmailError> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(SentMail {
                    subject: subject.to_owned(),
                    recipient: recipient.to_string(),
                    html_body: html_body.to_owned(),
                    text_body: text_body.to_owned(),
                });
            }
            Ok(())
        }
    }

    /// Rejects every message, like a relay that is down.
    #[derive(Default)]
    pub struct FailingRelay;

    #[async_trait]
    impl MailRelay for FailingRelay {
        async fn send(
            &self,
            _subject: &str,
            recipient: &Email,
            _html_body: &str,
            _text_body: &str,
        ) -> Result<(), EmailError> {
            Err(EmailError::InvalidAddress(format!(
                "relay unavailable for {recipient}"
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(from_address: &str) -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.mailhost.in".to_string(),
            smtp_port: 587,
            smtp_username: "orders@fashionstore.com".to_string(),
            smtp_password: SecretString::from("smtp-password"),
            encryption: SmtpEncryption::StartTls,
            from_address: from_address.to_string(),
        }
    }

    // Building the pooled transport spawns onto the current runtime.
    #[tokio::test]
    async fn test_relay_builds_without_connecting() {
        assert!(SmtpRelay::new(&config("Fashion Store <orders@fashionstore.com>")).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_sender_is_rejected() {
        assert!(matches!(
            SmtpRelay::new(&config("not an address")),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
