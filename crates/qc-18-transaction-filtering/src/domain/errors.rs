//! # Domain Errors
//!
//! Error types for the Transaction Filtering subsystem.
//!
//! Construction and verification fail through different types: building a
//! filtered transaction reports what the caller asked for wrongly, verifying
//! one always reports a single [`FilteredTransactionVerificationError`]
//! carrying the transaction id and the first failed check.

use shared_crypto::{CryptoError, SecureHash};
use thiserror::Error;

use super::value_objects::MerkleProofType;
use crate::ports::MarshallingError;

/// Merkle tree construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleTreeError {
    /// A tree needs at least one leaf.
    #[error("Cannot calculate a Merkle root from an empty leaf list")]
    EmptyLeaves,

    /// Leaf hashing rejected its input.
    #[error(transparent)]
    Digest(#[from] DigestProviderError),
}

/// Leaf hashing errors raised by a digest provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestProviderError {
    #[error("Leaf {index} requires a nonce")]
    MissingNonce { index: usize },

    #[error("Leaf {index} must not carry a nonce")]
    UnexpectedNonce { index: usize },

    #[error("Leaf {index} must not carry data in a size proof")]
    UnexpectedLeafData { index: usize },

    #[error("Leaf {index} carries an invalid leaf hash: {source}")]
    InvalidLeafHash { index: usize, source: CryptoError },

    #[error("Leaf {index} carries the zero padding hash")]
    ZeroLeafHash { index: usize },

    #[error("Position {index} does not fit in 32 bits")]
    PositionOverflow { index: usize },
}

/// Malformed Merkle proof.
///
/// Verification turns every one of these into a plain `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleProofError {
    #[error("Merkle proof declares an empty tree")]
    EmptyTree,

    #[error("Merkle proof does not reveal any leaves")]
    NoLeaves,

    #[error("Leaf index {index} out of range for tree size {tree_size}")]
    LeafIndexOutOfRange { index: usize, tree_size: usize },

    #[error("Duplicate leaf index {0} in Merkle proof")]
    DuplicateLeafIndex(usize),

    #[error("Merkle proof does not carry enough hashes")]
    MissingHashes,

    #[error("Merkle proof carries {unused} unused hashes")]
    UnusedHashes { unused: usize },

    #[error("Merkle proof uses the zero padding hash as a sibling")]
    ZeroSiblingHash,

    #[error(transparent)]
    Digest(#[from] DigestProviderError),
}

/// Metadata (component group 0) errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("Metadata component group is not disclosed")]
    MissingMetadataGroup,

    #[error("Metadata component group must reveal exactly one leaf, found {leaves}")]
    MalformedMetadataGroup { leaves: usize },

    #[error(transparent)]
    Marshalling(#[from] MarshallingError),

    #[error("Invalid transaction metadata: {0}")]
    InvalidMetadata(String),

    #[error("Unsupported digest algorithm in metadata: {0}")]
    UnsupportedAlgorithm(#[from] CryptoError),

    #[error("Invalid base64 in metadata field {field}: {message}")]
    InvalidPrefix { field: &'static str, message: String },

    #[error("Root Merkle tree leaf and node prefixes must differ")]
    IdenticalPrefixes,
}

/// Errors building a full transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireTransactionError {
    #[error("Transaction has no component groups")]
    NoComponentGroups,

    #[error("Metadata component group must hold exactly one component, found {count}")]
    MetadataGroupShape { count: usize },

    #[error("Privacy salt must not be all zeros")]
    ZeroPrivacySalt,

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Tree(#[from] MerkleTreeError),
}

/// Errors producing a filtered transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Component group {0} is filtered more than once")]
    DuplicateGroupIndex(usize),

    #[error("Component group {group_index} does not exist (transaction has {group_count} groups)")]
    GroupNotFound {
        group_index: usize,
        group_count: usize,
    },

    #[error("Leaf index {index} out of range for component group {group_index} of size {size}")]
    LeafIndexOutOfRange {
        group_index: usize,
        index: usize,
        size: usize,
    },

    #[error("Component {leaf_index} of group {group_index} cannot be read as {type_name}: {message}")]
    ComponentDecoding {
        group_index: usize,
        leaf_index: usize,
        type_name: &'static str,
        message: String,
    },

    #[error(transparent)]
    Marshalling(#[from] MarshallingError),

    #[error(transparent)]
    Tree(#[from] MerkleTreeError),

    #[error(transparent)]
    Proof(#[from] MerkleProofError),
}

/// Reason a filtered transaction was rejected.
///
/// Ordered the same way the checks run; the first failing check wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    #[error("Top level Merkle proof does not have any leaves")]
    NoTopLevelLeaves,

    #[error("Top level Merkle proof must have exactly one leaf with index 0, found {count}")]
    MetadataLeafCount { count: usize },

    #[error(
        "Top level Merkle proof indexes do not match the filtered component group indexes ({proof_indexes:?} vs {group_indexes:?})"
    )]
    IndexMismatch {
        proof_indexes: Vec<usize>,
        group_indexes: Vec<usize>,
    },

    #[error("Filtered component group stored under index {key} declares ordinal {ordinal}; indexes do not match")]
    OrdinalMismatch { key: usize, ordinal: usize },

    #[error("Filtered component group 0 (metadata) is missing")]
    MissingMetadataGroup,

    #[error(
        "Metadata component group proof must have tree size 1 and exactly one leaf, found tree size {tree_size} with {leaves} leaves"
    )]
    MalformedMetadataGroup { tree_size: usize, leaves: usize },

    #[error("Transaction metadata cannot be read: {0}")]
    UnreadableMetadata(MetadataError),

    #[error("Top level Merkle proof cannot be verified against transaction's id")]
    TopLevelProofUnverified,

    #[error(
        "Component group {ordinal} Merkle proof ({proof_type}) cannot be verified against its top level leaf hash"
    )]
    ComponentGroupUnverified {
        ordinal: usize,
        proof_type: MerkleProofType,
    },

    #[error("Component group {ordinal} is not disclosed")]
    ComponentGroupNotDisclosed { ordinal: usize },

    #[error("Component group {ordinal} does not reveal all of its {tree_size} components")]
    ComponentsNotVisible { ordinal: usize, tree_size: usize },
}

/// A filtered transaction failed verification.
///
/// Integrity failures are not transient; callers must treat this as a hard
/// rejection and never retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Filtered transaction {transaction_id} failed verification: {reason}")]
pub struct FilteredTransactionVerificationError {
    pub transaction_id: SecureHash,
    pub reason: VerificationFailure,
}
