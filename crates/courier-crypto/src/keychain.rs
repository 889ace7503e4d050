//! Hardware keychain integration
//!
//! Optional home for the relay's private key, instead of an env var.

use thiserror::Error;

use crate::keys::PrivateKeyMaterial;

const KEY_ACCOUNT: &str = "recipient_key";

#[derive(Error, Debug)]
pub enum KeychainError {
    #[error("Item not found")]
    NotFound,
    #[error("Platform error: {0}")]
    Platform(String),
}

pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    pub fn new(service_name: &str) -> Self {
        Self { service_name: service_name.to_string() }
    }

    fn entry(&self) -> Result<keyring::Entry, KeychainError> {
        keyring::Entry::new(&self.service_name, KEY_ACCOUNT)
            .map_err(|e| KeychainError::Platform(e.to_string()))
    }

    /// Store the PKCS#8 base64 private key
    pub fn store_private_key(&self, material: &PrivateKeyMaterial) -> Result<(), KeychainError> {
        self.entry()?
            .set_password(material.expose())
            .map_err(|e| KeychainError::Platform(e.to_string()))
    }

    pub fn retrieve_private_key(&self) -> Result<PrivateKeyMaterial, KeychainError> {
        let stored = self.entry()?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => KeychainError::NotFound,
            _ => KeychainError::Platform(e.to_string()),
        })?;
        Ok(PrivateKeyMaterial::new(stored))
    }
}
