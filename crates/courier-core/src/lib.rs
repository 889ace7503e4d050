//! Courier Core - the submission pipeline
//!
//! Shared by every frontend (HTTP server today). A submission is the raw
//! encrypted string a client posted; the [`Dispatcher`] takes it through
//! dedupe, decryption, validation and hand-off to a [`MailTransport`].

pub mod config;
pub mod dispatch;
pub mod guard;
pub mod message;
pub mod provider;
pub mod transport;

#[cfg(test)]
mod fixtures;

pub use config::{ConfigError, RelayConfig};
pub use dispatch::{Dispatcher, Outcome, RelayResponse};
pub use guard::SubmissionGuard;
pub use message::{validate, DecryptedMessage, ValidationError};
pub use provider::SmtpProvider;
pub use transport::{MailTransport, OutgoingMail, SmtpRelay, TransportError, TransportReceipt};
