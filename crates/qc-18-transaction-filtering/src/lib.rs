//! # QC-18 Transaction Filtering
//!
//! Selective disclosure of transaction components with Merkle proofs.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Let a party see only some component groups of a transaction while still
//! proving that what it sees belongs to the transaction id everyone agreed
//! on:
//! - Audit proofs reveal selected components with their nonces
//! - Size proofs reveal only how many components a group has
//! - Undisclosed groups stay behind their root hash
//!
//! ## Security Properties
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | Binding | Every group proof reaches a leaf of the top-level proof, which reaches the id |
//! | Hiding | Leaf nonces derived from a secret privacy salt, per group |
//! | Shape only | Size proofs carry opaque leaf hashes, never content |
//! | Second preimage | Distinct leaf/node domain prefixes at both tree levels |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-transaction-filtering/
//! ├── domain/          # Errors, value objects, filter parameters, metadata
//! ├── merkle/          # Digest providers, tree builder, proofs
//! ├── transaction/     # WireTransaction, factory, FilteredTransaction
//! ├── ports/           # JsonMarshallingService (outbound)
//! ├── adapters/        # serde_json marshalling
//! └── config.rs        # TransactionDigestConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod merkle;
pub mod ports;
pub mod transaction;

// Re-exports
pub use adapters::SerdeJsonMarshallingService;
pub use config::TransactionDigestConfig;
pub use domain::{
    AuditProofPredicate, ComponentGroupFilterParameters, ContentPredicate, DigestProviderError,
    DigestSettings, FilterError, FilteredTransactionVerificationError, MerkleDigestSettings,
    MerkleProofError, MerkleProofType, MerkleTreeError, MetadataError, PrivacySalt,
    TransactionMetadata, TrustedDigestSettings, UntrustedDigestSettings, VerificationFailure,
    WireTransactionError, METADATA_GROUP_INDEX,
};
pub use merkle::{
    IndexedMerkleLeaf, MerkleProof, MerkleTree, MerkleTreeHashDigestProvider,
    NonceHashDigestProvider, NonceSizeOnlyVerifyHashDigestProvider, NonceVerifyHashDigestProvider,
    TweakableHashDigestProvider,
};
pub use ports::{JsonMarshallingService, MarshallingError};
pub use shared_crypto::{DigestAlgorithm, SecureHash};
pub use transaction::{
    FilteredComponentGroup, FilteredTransaction, FilteredTransactionFactory, WireTransaction,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
