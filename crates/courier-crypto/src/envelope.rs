//! Wire format for encrypted submissions
//!
//! Current clients post `base64(JSON{encryptedKey, encryptedData, iv})`.
//! Older clients post bare `base64(RSA-OAEP(plaintext))`. Classification is a
//! pure function: anything that does not decode to a complete envelope is
//! treated as legacy ciphertext, never as an error.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

/// Hybrid envelope: RSA-wrapped AES key, GCM IV and GCM ciphertext, all base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    encrypted_key: String,
    encrypted_data: String,
    iv: String,
}

impl EncryptedEnvelope {
    pub fn new(
        encrypted_key: impl Into<String>,
        encrypted_data: impl Into<String>,
        iv: impl Into<String>,
    ) -> Self {
        Self {
            encrypted_key: encrypted_key.into(),
            encrypted_data: encrypted_data.into(),
            iv: iv.into(),
        }
    }

    pub fn encrypted_key(&self) -> &str {
        &self.encrypted_key
    }

    pub fn encrypted_data(&self) -> &str {
        &self.encrypted_data
    }

    pub fn iv(&self) -> &str {
        &self.iv
    }

    /// Serialize the way browser clients do: `btoa(JSON.stringify(envelope))`
    pub fn to_wire(&self) -> String {
        let object = json!({
            "encryptedKey": self.encrypted_key,
            "encryptedData": self.encrypted_data,
            "iv": self.iv,
        });
        STANDARD.encode(object.to_string())
    }
}

/// Bare RSA-OAEP ciphertext from clients that predate the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCiphertext(String);

impl LegacyCiphertext {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFormat {
    Envelope(EncryptedEnvelope),
    Legacy(LegacyCiphertext),
}

impl WireFormat {
    pub fn kind(&self) -> &'static str {
        match self {
            WireFormat::Envelope(_) => "envelope",
            WireFormat::Legacy(_) => "legacy",
        }
    }
}

/// Decide which wire format `raw` is in.
pub fn classify(raw: &str) -> WireFormat {
    match parse_envelope(raw.trim()) {
        Some(envelope) => WireFormat::Envelope(envelope),
        None => WireFormat::Legacy(LegacyCiphertext(raw.to_string())),
    }
}

fn parse_envelope(raw: &str) -> Option<EncryptedEnvelope> {
    let decoded = STANDARD.decode(raw).ok()?;
    let Value::Object(object) = serde_json::from_slice::<Value>(&decoded).ok()? else {
        return None;
    };

    let field = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    Some(EncryptedEnvelope {
        encrypted_key: field("encryptedKey")?,
        encrypted_data: field("encryptedData")?,
        iv: field("iv")?,
    })
}
