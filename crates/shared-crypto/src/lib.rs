//! # Shared Crypto - Digest Primitives
//!
//! Algorithm-agile hashing shared by the transaction subsystems.
//!
//! ## Components
//!
//! | Module | Contents | Use Case |
//! |--------|----------|----------|
//! | `hashing` | `DigestAlgorithm` (SHA-2, SHA-3, BLAKE3) | Leaf/node hashing |
//! | `secure_hash` | `SecureHash` | Transaction ids, Merkle roots |
//!
//! ## Security Properties
//!
//! - **Algorithm tagging**: a digest always carries its algorithm; equality
//!   compares both
//! - **Length checked**: a `SecureHash` can only hold a digest of the right
//!   length for its algorithm

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod secure_hash;

// Re-exports
pub use errors::CryptoError;
pub use hashing::DigestAlgorithm;
pub use secure_hash::SecureHash;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
