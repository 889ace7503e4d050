//! Courier Crypto - hybrid envelope layer
//!
//! Senders wrap a fresh AES-256-GCM key with the relay's RSA public key
//! (OAEP, SHA-256) and ship both as one base64 blob. This crate provides:
//! - Wire-format classification (hybrid envelope vs. legacy bare RSA)
//! - Private key material handling (PEM framing, parsing)
//! - Hybrid and legacy decryption, plus the matching sealing side
//! - OS keychain storage for the relay's private key

pub mod cipher;
pub mod envelope;
pub mod hybrid;
pub mod keychain;
pub mod keys;

#[cfg(test)]
mod fixtures;

pub use envelope::{classify, EncryptedEnvelope, LegacyCiphertext, WireFormat};
pub use hybrid::{decrypt_envelope, decrypt_legacy, open, seal, seal_legacy};
pub use keychain::KeychainProvider;
pub use keys::{generate_keypair, GeneratedKeypair, PrivateKeyMaterial, RecipientKey, SenderKey};

/// Errors that can occur in cryptographic operations
///
/// Decryption has a single failure variant: callers must not be
/// able to tell a bad RSA block from a bad GCM tag.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
