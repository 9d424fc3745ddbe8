//! # Secure Hash
//!
//! A digest tagged with the algorithm that produced it. Text form is
//! `ALGORITHM:HEX` with uppercase hex, e.g. `SHA-256:BA7816BF...`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CryptoError;
use crate::hashing::DigestAlgorithm;

/// Algorithm-tagged digest.
///
/// Equality covers both the algorithm and the bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SecureHash {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl SecureHash {
    /// Create from raw digest bytes, checking the length against the algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Result<Self, CryptoError> {
        let expected = algorithm.digest_length();
        if bytes.len() != expected {
            return Err(CryptoError::InvalidDigestLength {
                algorithm: algorithm.name(),
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { algorithm, bytes })
    }

    /// Digest output straight from a hasher; length is correct by construction.
    pub(crate) fn from_digest(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len(), algorithm.digest_length());
        Self { algorithm, bytes }
    }

    /// The all-zero digest for an algorithm, used to pad odd tree levels.
    pub fn zero_for(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            bytes: vec![0u8; algorithm.digest_length()],
        }
    }

    /// Algorithm that produced this digest.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into raw digest bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// True for the algorithm's zero hash.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Uppercase hex of the digest bytes, without the algorithm prefix.
    pub fn to_hex_string(&self) -> String {
        hex::encode_upper(&self.bytes)
    }
}

impl fmt::Display for SecureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex_string())
    }
}

impl fmt::Debug for SecureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for SecureHash {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, payload) = s
            .split_once(':')
            .ok_or_else(|| CryptoError::MalformedHash(s.to_string()))?;
        let algorithm: DigestAlgorithm = name.parse()?;
        let bytes = hex::decode(payload).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::new(algorithm, bytes)
    }
}

impl From<SecureHash> for String {
    fn from(hash: SecureHash) -> Self {
        hash.to_string()
    }
}

impl TryFrom<String> for SecureHash {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let result = SecureHash::new(DigestAlgorithm::Sha256, vec![0u8; 31]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidDigestLength {
                expected: 32,
                actual: 31,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_hash() {
        let zero = SecureHash::zero_for(DigestAlgorithm::Sha384);
        assert_eq!(zero.bytes().len(), 48);
        assert!(zero.is_zero());
        assert!(!DigestAlgorithm::Sha384.hash(b"x").is_zero());
    }

    #[test]
    fn test_display_and_parse() {
        let hash = DigestAlgorithm::Sha256.hash(b"abc");
        let text = hash.to_string();
        assert!(text.starts_with("SHA-256:BA7816BF"));

        let parsed: SecureHash = text.parse().unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let result = "SHA-256".parse::<SecureHash>();
        assert!(matches!(result, Err(CryptoError::MalformedHash(_))));
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        let result = "SHA-256:ZZ".parse::<SecureHash>();
        assert!(matches!(result, Err(CryptoError::InvalidHex(_))));
    }

    #[test]
    fn test_serde_as_text() {
        let hash = DigestAlgorithm::Blake3.hash(b"serde");
        let json = serde_json::to_string(&hash).unwrap();
        assert!(json.starts_with("\"BLAKE3:"));
        let back: SecureHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_serde_rejects_truncated_digest() {
        let result = serde_json::from_str::<SecureHash>("\"SHA-256:ABCD\"");
        assert!(result.is_err());
    }
}
