//! Crypto error types.

use thiserror::Error;

/// Digest and hash-parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Algorithm name not recognised
    #[error("Unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Digest length does not match the algorithm
    #[error("Invalid digest length for {algorithm}: expected {expected}, got {actual}")]
    InvalidDigestLength {
        /// Algorithm name
        algorithm: &'static str,
        /// Expected digest length in bytes
        expected: usize,
        /// Actual digest length in bytes
        actual: usize,
    },

    /// Text form is not `ALGORITHM:HEX`
    #[error("Malformed secure hash: {0}")]
    MalformedHash(String),

    /// Hex payload could not be decoded
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_digest_length_display() {
        let err = CryptoError::InvalidDigestLength {
            algorithm: "SHA-256",
            expected: 32,
            actual: 31,
        };
        let msg = err.to_string();
        assert!(msg.contains("SHA-256"));
        assert!(msg.contains("32"));
        assert!(msg.contains("31"));
    }

    #[test]
    fn test_unknown_algorithm_display() {
        let err = CryptoError::UnknownAlgorithm("MD5".to_string());
        assert!(err.to_string().contains("MD5"));
    }
}
