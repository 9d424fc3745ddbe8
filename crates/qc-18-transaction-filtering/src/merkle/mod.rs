//! # Merkle Layer
//!
//! Pure Merkle tree logic: digest providers, tree construction, and
//! multi-leaf proofs. No I/O.

pub mod digest;
pub mod proof;
pub mod tree;

pub use digest::{
    MerkleTreeHashDigestProvider, NonceHashDigestProvider, NonceSizeOnlyVerifyHashDigestProvider,
    NonceVerifyHashDigestProvider, TweakableHashDigestProvider,
};
pub use proof::{IndexedMerkleLeaf, MerkleProof};
pub use tree::MerkleTree;
