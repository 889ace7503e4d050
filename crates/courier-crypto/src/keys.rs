//! RSA key material
//!
//! Keys rest as bare base64 (SPKI for public, PKCS#8 for private) with no PEM
//! delimiters. Delimiters are added at the point of use, exactly once.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::{CryptoError, Result};

const PRIVATE_LABEL: &str = "PRIVATE KEY";
const PUBLIC_LABEL: &str = "PUBLIC KEY";
const PEM_LINE_WIDTH: usize = 64;

/// Default modulus size for freshly generated keypairs
pub const DEFAULT_KEY_BITS: usize = 2048;

/// The relay's private key as configured: PKCS#8 base64, with or without PEM framing.
#[derive(Clone)]
pub struct PrivateKeyMaterial(SecretString);

impl PrivateKeyMaterial {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::new(raw.into()))
    }

    /// Canonical PKCS#8 PEM for this material.
    ///
    /// Material that already carries `PRIVATE KEY` delimiters is re-flowed,
    /// not wrapped a second time. Any other PEM label is rejected.
    pub fn to_pem(&self) -> Result<Zeroizing<String>> {
        let body = pem_body(self.0.expose_secret(), PRIVATE_LABEL)?;
        Ok(wrap_pem(&body, PRIVATE_LABEL))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyMaterial([REDACTED])")
    }
}

/// Parsed private key used to open submissions.
pub struct RecipientKey {
    inner: RsaPrivateKey,
}

impl RecipientKey {
    pub fn from_material(material: &PrivateKeyMaterial) -> Result<Self> {
        let pem = material.to_pem()?;
        let inner = RsaPrivateKey::from_pkcs8_pem(pem.as_str())
            .map_err(|e| CryptoError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self { inner })
    }

    /// The matching public key, for sealing test payloads against ourselves.
    pub fn public_key(&self) -> SenderKey {
        SenderKey {
            inner: self.inner.to_public_key(),
        }
    }

    pub fn modulus_bits(&self) -> usize {
        self.inner.size() * 8
    }

    pub(crate) fn rsa(&self) -> &RsaPrivateKey {
        &self.inner
    }
}

impl fmt::Debug for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientKey")
            .field("bits", &self.modulus_bits())
            .finish_non_exhaustive()
    }
}

/// Public key held by senders.
#[derive(Debug, Clone)]
pub struct SenderKey {
    inner: RsaPublicKey,
}

impl SenderKey {
    /// Parse an SPKI public key given as bare base64 or as a `PUBLIC KEY` PEM block.
    pub fn from_spki_base64(input: &str) -> Result<Self> {
        let body = pem_body(input, PUBLIC_LABEL)?;
        let der = STANDARD
            .decode(body.as_bytes())
            .map_err(|e| CryptoError::InvalidKeyMaterial(e.to_string()))?;
        let inner = RsaPublicKey::from_public_key_der(&der)
            .map_err(|e| CryptoError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn to_spki_base64(&self) -> Result<String> {
        let der = self
            .inner
            .to_public_key_der()
            .map_err(|e| CryptoError::InvalidKeyMaterial(e.to_string()))?;
        Ok(STANDARD.encode(der.as_bytes()))
    }

    pub fn modulus_bits(&self) -> usize {
        self.inner.size() * 8
    }

    pub(crate) fn rsa(&self) -> &RsaPublicKey {
        &self.inner
    }
}

/// A fresh keypair in the at-rest format: bare base64, no delimiters.
pub struct GeneratedKeypair {
    pub public_spki: String,
    pub private_pkcs8: Zeroizing<String>,
}

impl GeneratedKeypair {
    pub fn private_material(&self) -> PrivateKeyMaterial {
        PrivateKeyMaterial::new(self.private_pkcs8.as_str())
    }
}

/// Generate an RSA keypair (public exponent 65537).
pub fn generate_keypair(bits: usize) -> Result<GeneratedKeypair> {
    let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;

    let pkcs8 = private
        .to_pkcs8_der()
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
    let spki = private
        .to_public_key()
        .to_public_key_der()
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;

    Ok(GeneratedKeypair {
        public_spki: STANDARD.encode(spki.as_bytes()),
        private_pkcs8: Zeroizing::new(STANDARD.encode(pkcs8.as_bytes())),
    })
}

/// Strip optional PEM framing and all whitespace, leaving the base64 body.
///
/// Env files often carry the key with literal `\n` escapes; those count as
/// whitespace here.
fn pem_body(input: &str, label: &str) -> Result<Zeroizing<String>> {
    let unescaped = Zeroizing::new(input.replace("\\n", "\n"));
    let trimmed = unescaped.trim();

    let body = if trimmed.starts_with("-----BEGIN ") {
        let begin = format!("-----BEGIN {label}-----");
        let end = format!("-----END {label}-----");
        trimmed
            .strip_prefix(begin.as_str())
            .and_then(|rest| rest.strip_suffix(end.as_str()))
            .ok_or_else(|| {
                CryptoError::InvalidKeyMaterial(format!("expected a {label} PEM block"))
            })?
    } else {
        trimmed
    };

    let compact: Zeroizing<String> =
        Zeroizing::new(body.chars().filter(|c| !c.is_whitespace()).collect());

    if compact.is_empty() {
        return Err(CryptoError::InvalidKeyMaterial("empty key body".into()));
    }
    if !compact
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
    {
        // Nested delimiters (double wrapping) land here too
        return Err(CryptoError::InvalidKeyMaterial(
            "key body is not base64".into(),
        ));
    }

    Ok(compact)
}

fn wrap_pem(body: &str, label: &str) -> Zeroizing<String> {
    let mut pem = Zeroizing::new(String::with_capacity(
        body.len() + body.len() / PEM_LINE_WIDTH + 2 * label.len() + 32,
    ));
    pem.push_str(&format!("-----BEGIN {label}-----\n"));
    // body is ASCII base64, so every byte offset is a char boundary
    let mut rest = body;
    while !rest.is_empty() {
        let (line, tail) = rest.split_at(rest.len().min(PEM_LINE_WIDTH));
        pem.push_str(line);
        pem.push('\n');
        rest = tail;
    }
    pem.push_str(&format!("-----END {label}-----\n"));
    pem
}
