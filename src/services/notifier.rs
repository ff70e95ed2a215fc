//! Email notifier providers.
//!
//! Booking confirmations are sent through the `EmailSender` seam: an SMTP
//! implementation backed by lettre, and a mock used in tests. Delivery is
//! at-most-once; callers never see a send failure.

use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Provider not enabled: {0}")]
    NotEnabled(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Send error: {0}")]
    SendFailed(String),
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<(), NotifierError>;
    fn is_enabled(&self) -> bool;
}

/// SMTP sender backed by lettre's async transport.
pub struct SmtpSender {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpSender {
    pub fn new(config: SmtpConfig) -> Result<Self, NotifierError> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(
            config.user.clone(),
            config.password.expose_secret().clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                NotifierError::Configuration(format!("Failed to create SMTP relay: {}", e))
            })?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpSender {
    async fn send(&self, email: &EmailMessage) -> Result<(), NotifierError> {
        if !self.config.enabled {
            return Err(NotifierError::NotEnabled(
                "SMTP email sender is not enabled".to_string(),
            ));
        }

        let transport = self.transport.as_ref().ok_or_else(|| {
            NotifierError::Configuration("SMTP transport not initialized".to_string())
        })?;

        let from_mailbox: Mailbox =
            format!("{} <{}>", self.config.from_name, self.config.from_email)
                .parse()
                .map_err(|e| {
                    NotifierError::Configuration(format!("Invalid from address: {}", e))
                })?;

        let to_mailbox: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotifierError::InvalidRecipient(format!("Invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body_text.clone())
            .map_err(|e| NotifierError::SendFailed(format!("Failed to build message: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| NotifierError::SendFailed(format!("Failed to send email: {}", e)))?;

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock email sender for testing.
pub struct MockEmailSender {
    enabled: bool,
    send_count: AtomicU64,
}

impl MockEmailSender {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            send_count: AtomicU64::new(0),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, email: &EmailMessage) -> Result<(), NotifierError> {
        if !self.enabled {
            return Err(NotifierError::NotEnabled(
                "Mock email sender is not enabled".to_string(),
            ));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "[MOCK] Email would be sent"
        );

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
