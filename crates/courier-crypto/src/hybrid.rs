//! Hybrid decryption: RSA-OAEP(SHA-256) unwraps an AES-256-GCM key, which
//! opens the payload.
//!
//! Every failure past key parsing is reported as
//! [`CryptoError::DecryptionFailed`], whichever stage broke. The relay is a
//! decryption oracle for anyone who can POST to it; it must not say more.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::cipher;
use crate::envelope::{EncryptedEnvelope, WireFormat};
use crate::keys::{RecipientKey, SenderKey};
use crate::{CryptoError, Result};

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

fn decode(field: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(field.trim())
        .map_err(|_| CryptoError::DecryptionFailed)
}

fn rsa_decrypt(key: &RecipientKey, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    key.rsa()
        .decrypt_blinded(&mut OsRng, oaep(), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::DecryptionFailed)
}

fn into_text(plaintext: Zeroizing<Vec<u8>>) -> Result<String> {
    String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::DecryptionFailed)
}

/// Open a hybrid envelope.
pub fn decrypt_envelope(key: &RecipientKey, envelope: &EncryptedEnvelope) -> Result<String> {
    let wrapped_key = decode(envelope.encrypted_key())?;
    let symmetric = rsa_decrypt(key, &wrapped_key)?;
    if symmetric.len() != cipher::KEY_SIZE {
        tracing::debug!(len = symmetric.len(), "unwrapped key has wrong length");
        return Err(CryptoError::DecryptionFailed);
    }

    let iv = decode(envelope.iv())?;
    let data = decode(envelope.encrypted_data())?;
    let plaintext =
        cipher::decrypt(&symmetric[..], &iv, &data).map_err(|_| CryptoError::DecryptionFailed)?;

    into_text(plaintext)
}

/// Open bare RSA-OAEP ciphertext from pre-envelope clients.
pub fn decrypt_legacy(key: &RecipientKey, ciphertext: &str) -> Result<String> {
    let raw = decode(ciphertext)?;
    into_text(rsa_decrypt(key, &raw)?)
}

/// Open whichever wire format the submission arrived in.
pub fn open(key: &RecipientKey, wire: &WireFormat) -> Result<String> {
    match wire {
        WireFormat::Envelope(envelope) => decrypt_envelope(key, envelope),
        WireFormat::Legacy(legacy) => decrypt_legacy(key, legacy.as_str()),
    }
}

/// Seal `plaintext` for the holder of `recipient`'s private key, the way the
/// browser client does.
pub fn seal(recipient: &SenderKey, plaintext: &[u8]) -> Result<EncryptedEnvelope> {
    let key = cipher::generate_key().map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let sealed =
        cipher::encrypt(&key[..], plaintext).map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let wrapped_key = recipient
        .rsa()
        .encrypt(&mut OsRng, oaep(), &key[..])
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedEnvelope::new(
        STANDARD.encode(wrapped_key),
        STANDARD.encode(sealed.ciphertext),
        STANDARD.encode(sealed.iv),
    ))
}

/// Legacy sealing: bare RSA-OAEP, so the plaintext must fit one RSA block
/// (190 bytes for a 2048-bit key).
pub fn seal_legacy(recipient: &SenderKey, plaintext: &[u8]) -> Result<String> {
    let ciphertext = recipient
        .rsa()
        .encrypt(&mut OsRng, oaep(), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    Ok(STANDARD.encode(ciphertext))
}
