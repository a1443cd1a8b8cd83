//! Password gate.
//!
//! The check is a plain digest comparison done locally and protects nothing;
//! it only keeps the reader from opening straight into the text.

use sha2::{Digest, Sha256};

use crate::storage::{AUTH_KEY, KeyValueStore};

pub const PASSWORD_HASH: &str = "f2110e6cf92b93ae7b8ba2a41347889c1b864a2db67289f2d82f8d71854c24be";

/// Lowercase hex SHA-256 of `text`.
pub fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Unlocked,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct Gate {
    expected: String,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(PASSWORD_HASH)
    }
}

impl Gate {
    pub fn new(expected: impl Into<String>) -> Self {
        Self { expected: expected.into().trim().to_ascii_lowercase() }
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn check(&self, attempt: &str) -> bool {
        digest(attempt) == self.expected
    }

    /// Checks `attempt` and, on a match, stores the digest as the token.
    pub fn submit(&self, attempt: &str, store: &mut dyn KeyValueStore) -> Verdict {
        if !self.check(attempt) {
            tracing::info!("password rejected");
            return Verdict::Rejected;
        }
        self.persist(store);
        Verdict::Unlocked
    }

    /// True when a token from an earlier unlock is still valid.
    pub fn restore(&self, store: &dyn KeyValueStore) -> bool {
        store.get(AUTH_KEY).as_deref() == Some(self.expected.as_str())
    }

    pub fn persist(&self, store: &mut dyn KeyValueStore) {
        if let Err(e) = store.set(AUTH_KEY, &self.expected) {
            tracing::warn!(error = %e, "could not persist auth token");
        }
    }
}
