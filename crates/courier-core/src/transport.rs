//! Outbound mail transport
//!
//! The dispatcher only needs "hand this message off, tell me if that
//! worked". [`SmtpRelay`] does that over authenticated STARTTLS SMTP. No
//! retries or queueing here.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

/// A validated message ready to leave the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// What the SMTP server said when it accepted the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportReceipt {
    pub code: String,
    pub message: Vec<String>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<TransportReceipt, TransportError>;
}

pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &SecretString,
    ) -> Result<Self, TransportError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| TransportError::Smtp(e.to_string()))?
            .port(port)
            .credentials(Credentials::new(
                username.to_string(),
                password.expose_secret().clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| {
        TransportError::Address {
            address: address.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Build the HTML message, addressed to every recipient at once.
pub(crate) fn build_message(mail: &OutgoingMail) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(mailbox(&mail.from)?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML);

    for to in &mail.to {
        builder = builder.to(mailbox(to)?);
    }

    builder
        .body(mail.html.clone())
        .map_err(|e| TransportError::Message(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpRelay {
    async fn send(&self, mail: OutgoingMail) -> Result<TransportReceipt, TransportError> {
        let message = build_message(&mail)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| TransportError::Smtp(e.to_string()))?;

        Ok(TransportReceipt {
            code: response.code().to_string(),
            message: response.message().map(str::to_owned).collect(),
        })
    }
}
