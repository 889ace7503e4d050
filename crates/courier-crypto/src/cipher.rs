//! AES-256-GCM authenticated encryption
//!
//! Same layout WebCrypto's `AES-GCM` produces in the browser:
//! - 256-bit key
//! - 96-bit IV, carried next to the ciphertext rather than inside it
//! - 128-bit tag appended to the ciphertext

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;
use zeroize::Zeroizing;

/// 256-bit key (32 bytes)
pub const KEY_SIZE: usize = 32;
/// 96-bit IV (12 bytes)
pub const IV_SIZE: usize = 12;
/// GCM authentication tag (16 bytes)
pub const TAG_SIZE: usize = 16;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed - data may be corrupted or tampered")]
    DecryptionFailed,

    #[error("Invalid key size: expected {KEY_SIZE}, got {0}")]
    InvalidKeySize(usize),

    #[error("Invalid IV size: expected {IV_SIZE}, got {0}")]
    InvalidIvSize(usize),

    #[error("System randomness unavailable")]
    Randomness,
}

/// Output of [`encrypt`]: the IV travels separately on the wire.
pub struct Sealed {
    pub iv: [u8; IV_SIZE],
    /// ciphertext || tag
    pub ciphertext: Vec<u8>,
}

/// Generate a cryptographically secure random key
pub fn generate_key() -> Result<Zeroizing<[u8; KEY_SIZE]>, CipherError> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    SystemRandom::new()
        .fill(&mut key[..])
        .map_err(|_| CipherError::Randomness)?;
    Ok(key)
}

/// Generate a fresh IV. Never reuse one under the same key.
pub fn generate_iv() -> Result<[u8; IV_SIZE], CipherError> {
    let mut iv = [0u8; IV_SIZE];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| CipherError::Randomness)?;
    Ok(iv)
}

/// Encrypt plaintext with AES-256-GCM under a freshly drawn IV
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Sealed, CipherError> {
    if key.len() != KEY_SIZE {
        return Err(CipherError::InvalidKeySize(key.len()));
    }

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeySize(key.len()))?;

    let iv = generate_iv()?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CipherError::EncryptionFailed)?;

    Ok(Sealed { iv, ciphertext })
}

/// Decrypt `ciphertext || tag` produced under `key` and `iv`.
///
/// Fails closed: a flipped bit anywhere in the IV, ciphertext or tag is an
/// error, never garbage plaintext.
pub fn decrypt(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    if key.len() != KEY_SIZE {
        return Err(CipherError::InvalidKeySize(key.len()));
    }

    if iv.len() != IV_SIZE {
        return Err(CipherError::InvalidIvSize(iv.len()));
    }

    if ciphertext.len() < TAG_SIZE {
        return Err(CipherError::DecryptionFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeySize(key.len()))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CipherError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = generate_key().unwrap();
        let plaintext = b"{\"subject\":\"quarterly report\"}";

        let sealed = encrypt(&key[..], plaintext).unwrap();

        // Tag is appended
        assert_eq!(sealed.ciphertext.len(), plaintext.len() + TAG_SIZE);
        assert_ne!(&sealed.ciphertext[..plaintext.len()], plaintext);

        let decrypted = decrypt(&key[..], &sealed.iv, &sealed.ciphertext).unwrap();
        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn test_tampered_tag_fails() {
        let key = generate_key().unwrap();
        let mut sealed = encrypt(&key[..], b"secret data").unwrap();

        if let Some(byte) = sealed.ciphertext.last_mut() {
            *byte ^= 0x01;
        }

        assert!(decrypt(&key[..], &sealed.iv, &sealed.ciphertext).is_err());
    }

    #[test]
    fn test_tampered_iv_fails() {
        let key = generate_key().unwrap();
        let mut sealed = encrypt(&key[..], b"secret data").unwrap();
        sealed.iv[0] ^= 0x80;

        assert!(decrypt(&key[..], &sealed.iv, &sealed.ciphertext).is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = generate_key().unwrap();
        let key2 = generate_key().unwrap();

        let sealed = encrypt(&key1[..], b"secret data").unwrap();

        assert!(decrypt(&key2[..], &sealed.iv, &sealed.ciphertext).is_err());
    }

    #[test]
    fn test_rejects_bad_sizes() {
        let key = generate_key().unwrap();
        let sealed = encrypt(&key[..], b"x").unwrap();

        assert!(matches!(
            decrypt(&key[..16], &sealed.iv, &sealed.ciphertext),
            Err(CipherError::InvalidKeySize(16))
        ));
        assert!(matches!(
            decrypt(&key[..], &sealed.iv[..8], &sealed.ciphertext),
            Err(CipherError::InvalidIvSize(8))
        ));
        assert!(matches!(
            decrypt(&key[..], &sealed.iv, &sealed.ciphertext[..4]),
            Err(CipherError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = generate_key().unwrap();
        let a = encrypt(&key[..], b"same").unwrap();
        let b = encrypt(&key[..], b"same").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }
}
