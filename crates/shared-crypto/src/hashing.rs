//! # Digest Algorithms
//!
//! Algorithm-agile hashing. Every digest produced here is tagged with the
//! algorithm that made it, so hashes from different algorithms never compare
//! equal even when their bytes happen to coincide.
//!
//! | Algorithm | Length | Backend |
//! |-----------|--------|---------|
//! | SHA-256   | 32     | `sha2`  |
//! | SHA-384   | 48     | `sha2`  |
//! | SHA-512   | 64     | `sha2`  |
//! | SHA3-256  | 32     | `sha3`  |
//! | SHA3-512  | 64     | `sha3`  |
//! | BLAKE3    | 32     | `blake3`|

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};
use sha3::{Sha3_256, Sha3_512};

use crate::errors::CryptoError;
use crate::secure_hash::SecureHash;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256 (FIPS 180-4)
    #[serde(rename = "SHA-256")]
    Sha256,
    /// SHA-384 (FIPS 180-4)
    #[serde(rename = "SHA-384")]
    Sha384,
    /// SHA-512 (FIPS 180-4)
    #[serde(rename = "SHA-512")]
    Sha512,
    /// SHA3-256 (FIPS 202)
    #[serde(rename = "SHA3-256")]
    Sha3_256,
    /// SHA3-512 (FIPS 202)
    #[serde(rename = "SHA3-512")]
    Sha3_512,
    /// BLAKE3, 256-bit output
    #[serde(rename = "BLAKE3")]
    Blake3,
}

impl DigestAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [DigestAlgorithm; 6] = [
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Sha3_256,
        DigestAlgorithm::Sha3_512,
        DigestAlgorithm::Blake3,
    ];

    /// Canonical algorithm name, as written in metadata and hash text form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_512 => "SHA3-512",
            Self::Blake3 => "BLAKE3",
        }
    }

    /// Output length in bytes.
    pub fn digest_length(&self) -> usize {
        match self {
            Self::Sha256 | Self::Sha3_256 | Self::Blake3 => 32,
            Self::Sha384 => 48,
            Self::Sha512 | Self::Sha3_512 => 64,
        }
    }

    /// Hash data (one-shot).
    pub fn hash(&self, data: &[u8]) -> SecureHash {
        self.hash_parts(&[data])
    }

    /// Hash the concatenation of several inputs without allocating it.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> SecureHash {
        let bytes = match self {
            Self::Sha256 => digest_parts::<Sha256>(parts),
            Self::Sha384 => digest_parts::<Sha384>(parts),
            Self::Sha512 => digest_parts::<Sha512>(parts),
            Self::Sha3_256 => digest_parts::<Sha3_256>(parts),
            Self::Sha3_512 => digest_parts::<Sha3_512>(parts),
            Self::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                hasher.finalize().as_bytes().to_vec()
            }
        };
        SecureHash::from_digest(*self, bytes)
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CryptoError::UnknownAlgorithm(s.to_string()))
    }
}
