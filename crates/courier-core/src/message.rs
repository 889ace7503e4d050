//! Decrypted message schema and validation
//!
//! The plaintext inside a submission is JSON:
//! `{"toEmail": [...], "subject": "...", "mailText": "<html>"}`.
//! Validation failures are reported to the sender as a generic "Invalid
//! token"; the failing field is kept for our own logs only.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Required fields, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ToEmail,
    Subject,
    MailText,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::ToEmail => "toEmail",
            Field::Subject => "subject",
            Field::MailText => "mailText",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Plaintext is not a JSON object of the expected shape
    #[error("invalid message fields")]
    Malformed,

    #[error("invalid message fields")]
    Missing(Field),
}

impl ValidationError {
    /// Which field failed, for server-side logs
    pub fn field(&self) -> Option<Field> {
        match self {
            ValidationError::Malformed => None,
            ValidationError::Missing(field) => Some(*field),
        }
    }
}

/// A message that passed validation and can be handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    pub to_email: Vec<String>,
    pub subject: String,
    /// HTML body
    pub mail_text: String,
}

/// Clients send either one address or a list. Any other shape, an empty
/// list, or an empty entry counts as missing.
fn recipients(value: Option<&Value>) -> Option<Vec<String>> {
    let addresses = match value? {
        Value::String(address) => vec![address.clone()],
        Value::Array(entries) => entries
            .iter()
            .map(|entry| entry.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()?,
        _ => return None,
    };

    if addresses.is_empty() || addresses.iter().any(String::is_empty) {
        return None;
    }
    Some(addresses)
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Decode and validate decrypted plaintext. First failing field wins.
///
/// Content is not inspected beyond being a non-empty string: addresses are
/// not syntax-checked here, the transport rejects bad ones.
pub fn validate(plaintext: &str) -> Result<DecryptedMessage, ValidationError> {
    let value: Value = serde_json::from_str(plaintext).map_err(|_| ValidationError::Malformed)?;
    let Value::Object(fields) = value else {
        return Err(ValidationError::Malformed);
    };

    let to_email =
        recipients(fields.get("toEmail")).ok_or(ValidationError::Missing(Field::ToEmail))?;
    let subject = text(fields.get("subject")).ok_or(ValidationError::Missing(Field::Subject))?;
    let mail_text =
        text(fields.get("mailText")).ok_or(ValidationError::Missing(Field::MailText))?;

    Ok(DecryptedMessage {
        to_email,
        subject,
        mail_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_complete_message() {
        let msg = validate(
            r#"{"toEmail":["a@b.com","c@d.org"],"subject":"Hi","mailText":"<p>hi</p>"}"#,
        )
        .unwrap();

        assert_eq!(msg.to_email, vec!["a@b.com", "c@d.org"]);
        assert_eq!(msg.subject, "Hi");
        assert_eq!(msg.mail_text, "<p>hi</p>");
    }

    #[test]
    fn test_single_recipient_string() {
        let msg = validate(r#"{"toEmail":"a@b.com","subject":"Hi","mailText":"x"}"#).unwrap();
        assert_eq!(msg.to_email, vec!["a@b.com"]);
    }

    #[test]
    fn test_no_address_syntax_check() {
        let msg =
            validate(r#"{"toEmail":["not an address"],"subject":"s","mailText":"t"}"#).unwrap();
        assert_eq!(msg.to_email, vec!["not an address"]);
    }

    #[test]
    fn test_missing_subject() {
        assert_eq!(
            validate(r#"{"toEmail":["a@b.com"],"mailText":"x"}"#),
            Err(ValidationError::Missing(Field::Subject))
        );
    }

    #[test]
    fn test_missing_to_email() {
        assert_eq!(
            validate(r#"{"subject":"s","mailText":"x"}"#),
            Err(ValidationError::Missing(Field::ToEmail))
        );
        assert_eq!(
            validate(r#"{"toEmail":[],"subject":"s","mailText":"x"}"#),
            Err(ValidationError::Missing(Field::ToEmail))
        );
        assert_eq!(
            validate(r#"{"toEmail":["a@b.com",""],"subject":"s","mailText":"x"}"#),
            Err(ValidationError::Missing(Field::ToEmail))
        );
    }

    #[test]
    fn test_missing_mail_text() {
        assert_eq!(
            validate(r#"{"toEmail":"a@b.com","subject":"s","mailText":""}"#),
            Err(ValidationError::Missing(Field::MailText))
        );
    }

    #[test]
    fn test_whitespace_content_is_present() {
        let msg = validate(r#"{"toEmail":["a@b.com"],"subject":" ","mailText":"x"}"#).unwrap();
        assert_eq!(msg.subject, " ");

        let msg = validate(r#"{"toEmail":" ","subject":"s","mailText":"\n"}"#).unwrap();
        assert_eq!(msg.to_email, vec![" "]);
        assert_eq!(msg.mail_text, "\n");
    }

    #[test]
    fn test_first_failure_wins() {
        assert_eq!(validate("{}"), Err(ValidationError::Missing(Field::ToEmail)));
        assert_eq!(
            validate(r#"{"toEmail":"a@b.com"}"#),
            Err(ValidationError::Missing(Field::Subject))
        );
        assert_eq!(
            validate(r#"{"subject":42,"mailText":"x"}"#),
            Err(ValidationError::Missing(Field::ToEmail))
        );
    }

    #[test]
    fn test_wrong_types_fail_their_field() {
        assert_eq!(
            validate(r#"{"toEmail":"a@b.com","subject":42,"mailText":"x"}"#),
            Err(ValidationError::Missing(Field::Subject))
        );
        assert_eq!(
            validate(r#"{"toEmail":["a@b.com",7],"subject":"s","mailText":"x"}"#),
            Err(ValidationError::Missing(Field::ToEmail))
        );
        assert_eq!(
            validate(r#"{"toEmail":"a@b.com","subject":"s","mailText":null}"#),
            Err(ValidationError::Missing(Field::MailText))
        );
    }

    #[test]
    fn test_malformed_plaintext() {
        assert_eq!(validate("not json"), Err(ValidationError::Malformed));
        assert_eq!(validate("[1,2,3]"), Err(ValidationError::Malformed));
    }

    #[test]
    fn test_errors_display_identically() {
        let shown: Vec<String> = [
            ValidationError::Malformed,
            ValidationError::Missing(Field::ToEmail),
            ValidationError::Missing(Field::Subject),
            ValidationError::Missing(Field::MailText),
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert!(shown.windows(2).all(|w| w[0] == w[1]));
    }
}
