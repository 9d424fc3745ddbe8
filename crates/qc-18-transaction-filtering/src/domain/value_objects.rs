//! # Value Objects
//!
//! Immutable value objects for the Transaction Filtering subsystem.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::errors::WireTransactionError;

/// Ordinal of the metadata component group.
///
/// Group 0 always holds exactly one component (the JSON metadata) and is
/// always disclosed, so every recipient can learn the digest settings.
pub const METADATA_GROUP_INDEX: usize = 0;

/// Domain separator prepended to nonce-family leaf hashes.
pub const LEAF_DOMAIN: &[u8] = &[0x00];

/// Domain separator prepended to nonce-family node hashes.
pub const NODE_DOMAIN: &[u8] = &[0x01];

/// Privacy salt length in bytes.
pub const PRIVACY_SALT_LENGTH: usize = 32;

/// What a component group proof reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MerkleProofType {
    /// Leaves carry real content.
    Audit,
    /// Leaves carry opaque leaf hashes only; commits to the component count.
    Size,
}

impl fmt::Display for MerkleProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audit => f.write_str("AUDIT"),
            Self::Size => f.write_str("SIZE"),
        }
    }
}

/// Per-transaction secret entropy from which every leaf nonce is derived.
///
/// Only parties holding the full transaction know it. Without it a hash of a
/// small or guessable component cannot be brute-forced back to its content.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySalt([u8; PRIVACY_SALT_LENGTH]);

impl PrivacySalt {
    /// Wrap salt bytes. All-zero salt is rejected.
    pub fn new(bytes: [u8; PRIVACY_SALT_LENGTH]) -> Result<Self, WireTransactionError> {
        if bytes.iter().all(|b| *b == 0) {
            return Err(WireTransactionError::ZeroPrivacySalt);
        }
        Ok(Self(bytes))
    }

    /// Fresh salt from the thread-local CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; PRIVACY_SALT_LENGTH];
        loop {
            rand::thread_rng().fill_bytes(&mut bytes);
            if bytes.iter().any(|b| *b != 0) {
                return Self(bytes);
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8; PRIVACY_SALT_LENGTH] {
        &self.0
    }
}

// Never print the salt itself.
impl fmt::Debug for PrivacySalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivacySalt(..)")
    }
}
