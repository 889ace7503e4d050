//! Duplicate-submission guard
//!
//! Remembers every raw ciphertext string this process has accepted for
//! processing. Keyed on the ciphertext as posted, before decryption: the same
//! plaintext sealed twice has a fresh AES key, IV and OAEP padding each time,
//! so it is NOT recognised as a repeat.
//!
//! The set is unbounded and lives as long as the process.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct SubmissionGuard {
    seen: Mutex<HashSet<String>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `raw` was seen before. Otherwise records it and
    /// returns `false`. Lookup and insert happen under one lock, so two
    /// concurrent identical submissions cannot both get `false`.
    pub fn check_and_record(&self, raw: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.contains(raw) {
            return true;
        }
        seen.insert(raw.to_owned());
        false
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
