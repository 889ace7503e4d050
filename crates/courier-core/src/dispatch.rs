//! Submission orchestration
//!
//! ```text
//! Received ─┬─ Unconfigured
//!           ├─ Deduped
//!           └─ Decrypting ─┬─ DecryptFailed
//!                          └─ Validating ─┬─ ValidationFailed
//!                                         └─ Dispatching ─┬─ Dispatched
//!                                                         └─ DispatchFailed
//! ```
//!
//! Strictly forward; every submission ends in exactly one [`Outcome`].

use std::sync::Arc;

use courier_crypto::{classify, open, RecipientKey};
use serde::Serialize;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::guard::SubmissionGuard;
use crate::message::validate;
use crate::transport::{MailTransport, OutgoingMail, TransportError, TransportReceipt};

pub const MSG_SENT: &str = "Message sent";
pub const MSG_NOT_SENT: &str = "Message not sent";
pub const ERR_INVALID_TOKEN: &str = "Invalid token";
pub const ERR_ALREADY_SENT: &str = "Mail already sent";
pub const ERR_TOKEN_REQUIRED: &str = "Back-end token is required";
pub const ERR_TRANSPORT: &str = "Mail transport failed";

/// Terminal state of one submission
#[derive(Debug)]
pub enum Outcome {
    /// Key material or sender credentials are not configured
    Unconfigured,
    Deduped,
    DecryptFailed,
    ValidationFailed,
    Dispatched(TransportReceipt),
    DispatchFailed(TransportError),
}

/// Body returned to whoever posted the submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayResponse {
    pub message: String,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<TransportReceipt>,
}

impl RelayResponse {
    pub fn rejected(error: &str) -> Self {
        Self {
            message: MSG_NOT_SENT.to_string(),
            sent: false,
            error: Some(error.to_string()),
            info: None,
        }
    }
}

impl Outcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Outcome::Dispatched(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Unconfigured => "unconfigured",
            Outcome::Deduped => "deduped",
            Outcome::DecryptFailed => "decrypt_failed",
            Outcome::ValidationFailed => "validation_failed",
            Outcome::Dispatched(_) => "dispatched",
            Outcome::DispatchFailed(_) => "dispatch_failed",
        }
    }

    /// Caller-visible record. Decryption and validation failures are
    /// indistinguishable.
    pub fn response(&self) -> RelayResponse {
        match self {
            Outcome::Dispatched(receipt) => RelayResponse {
                message: MSG_SENT.to_string(),
                sent: true,
                error: None,
                info: Some(receipt.clone()),
            },
            Outcome::Unconfigured => RelayResponse::rejected(ERR_TOKEN_REQUIRED),
            Outcome::Deduped => RelayResponse::rejected(ERR_ALREADY_SENT),
            Outcome::DecryptFailed | Outcome::ValidationFailed => {
                RelayResponse::rejected(ERR_INVALID_TOKEN)
            }
            Outcome::DispatchFailed(_) => RelayResponse::rejected(ERR_TRANSPORT),
        }
    }

    /// HTTP status for the response
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Dispatched(_) => 200,
            Outcome::DecryptFailed | Outcome::ValidationFailed => 400,
            Outcome::Deduped => 409,
            Outcome::Unconfigured => 500,
            Outcome::DispatchFailed(_) => 502,
        }
    }
}

struct Route {
    sender: String,
    transport: Arc<dyn MailTransport>,
}

/// Runs submissions through dedupe, decryption, validation and dispatch.
pub struct Dispatcher {
    key: Option<RecipientKey>,
    route: Option<Route>,
    guard: Arc<SubmissionGuard>,
}

impl Dispatcher {
    /// A dispatcher with no key and no transport answers every submission
    /// with [`Outcome::Unconfigured`].
    pub fn new(guard: Arc<SubmissionGuard>) -> Self {
        Self {
            key: None,
            route: None,
            guard,
        }
    }

    pub fn with_key(mut self, key: RecipientKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_transport(
        mut self,
        sender: impl Into<String>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        self.route = Some(Route {
            sender: sender.into(),
            transport,
        });
        self
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some() && self.route.is_some()
    }

    pub fn guard(&self) -> &SubmissionGuard {
        &self.guard
    }

    /// Process one raw submission string.
    pub async fn submit(&self, raw: &str) -> Outcome {
        let span = tracing::info_span!("submission", id = %Uuid::new_v4());
        async {
            let outcome = self.run(raw).await;
            debug!(outcome = outcome.label(), "submission finished");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, raw: &str) -> Outcome {
        debug!(len = raw.len(), "received");

        let (Some(key), Some(route)) = (&self.key, &self.route) else {
            warn!("rejecting submission: relay is missing key material or sender credentials");
            return Outcome::Unconfigured;
        };

        if self.guard.check_and_record(raw) {
            info!("duplicate submission rejected");
            return Outcome::Deduped;
        }

        let wire = classify(raw);
        debug!(format = wire.kind(), "decrypting");
        let plaintext = match open(key, &wire) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(format = wire.kind(), error = %e, "submission did not decrypt");
                return Outcome::DecryptFailed;
            }
        };

        debug!("validating");
        let message = match validate(&plaintext) {
            Ok(message) => message,
            Err(e) => {
                warn!(field = e.field().map(|f| f.as_str()), "decrypted message failed validation");
                return Outcome::ValidationFailed;
            }
        };

        debug!(recipients = message.to_email.len(), "dispatching");
        let mail = OutgoingMail {
            from: route.sender.clone(),
            to: message.to_email,
            subject: message.subject,
            html: message.mail_text,
        };

        match route.transport.send(mail).await {
            Ok(receipt) => {
                info!(code = %receipt.code, "message handed to transport");
                Outcome::Dispatched(receipt)
            }
            Err(e) => {
                error!(error = %e, "transport failed");
                Outcome::DispatchFailed(e)
            }
        }
    }
}
