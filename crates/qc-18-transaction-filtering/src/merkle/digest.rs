//! # Merkle Hash Digest Providers
//!
//! Pluggable leaf/node hashing strategies.
//!
//! | Provider | Leaf hash | Used for |
//! |----------|-----------|----------|
//! | [`TweakableHashDigestProvider`] | `H(leaf_prefix ‖ data)` | Top-level tree over group roots |
//! | [`NonceHashDigestProvider`] | `H(0x00 ‖ nonce ‖ data)`, nonce derived from entropy | Building group trees and proofs |
//! | [`NonceVerifyHashDigestProvider`] | `H(0x00 ‖ nonce ‖ data)`, nonce from the proof | Verifying audit proofs |
//! | [`NonceSizeOnlyVerifyHashDigestProvider`] | the opaque hash carried in the proof | Verifying size proofs |
//!
//! The three nonce providers share one node rule, `H(0x01 ‖ left ‖ right)`,
//! which is what lets a size proof reach the same root as the full tree.

use shared_crypto::{DigestAlgorithm, SecureHash};
use tracing::debug;

use super::proof::{IndexedMerkleLeaf, MerkleProof};
use super::tree::MerkleTree;
use crate::domain::{
    DigestProviderError, MerkleProofError, MerkleTreeError, PrivacySalt, LEAF_DOMAIN, NODE_DOMAIN,
};

/// Leaf and node hashing for a Merkle tree.
///
/// Providers are stateless values, freely shared across threads.
pub trait MerkleTreeHashDigestProvider: Send + Sync {
    /// Digest algorithm every hash from this provider uses.
    fn algorithm(&self) -> DigestAlgorithm;

    /// Nonce for the leaf at `index`, if this provider derives nonces.
    fn leaf_nonce(&self, _index: usize) -> Option<Vec<u8>> {
        None
    }

    /// Hash a leaf.
    fn leaf_hash(
        &self,
        index: usize,
        nonce: Option<&[u8]>,
        data: &[u8],
    ) -> Result<SecureHash, DigestProviderError>;

    /// Hash two children into their parent.
    fn node_hash(&self, left: &SecureHash, right: &SecureHash) -> SecureHash;

    /// Padding for odd-width levels.
    fn zero_hash(&self) -> SecureHash {
        SecureHash::zero_for(self.algorithm())
    }

    /// Check a proof against an expected root.
    ///
    /// Malformed proofs fail verification rather than raise.
    fn verify(&self, proof: &MerkleProof, expected_root: &SecureHash) -> bool {
        match proof.calculate_root(self) {
            Ok(root) => root == *expected_root,
            Err(e) => {
                debug!("[qc-18] Rejecting malformed Merkle proof: {}", e);
                false
            }
        }
    }
}

/// Root-level provider with caller-chosen domain prefixes.
///
/// Deterministic, so only suitable where leaves are already opaque hashes
/// (component group roots), never raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakableHashDigestProvider {
    algorithm: DigestAlgorithm,
    leaf_prefix: Vec<u8>,
    node_prefix: Vec<u8>,
}

impl TweakableHashDigestProvider {
    pub fn new(algorithm: DigestAlgorithm, leaf_prefix: Vec<u8>, node_prefix: Vec<u8>) -> Self {
        Self {
            algorithm,
            leaf_prefix,
            node_prefix,
        }
    }

    pub fn leaf_prefix(&self) -> &[u8] {
        &self.leaf_prefix
    }

    pub fn node_prefix(&self) -> &[u8] {
        &self.node_prefix
    }
}

impl MerkleTreeHashDigestProvider for TweakableHashDigestProvider {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn leaf_hash(
        &self,
        index: usize,
        nonce: Option<&[u8]>,
        data: &[u8],
    ) -> Result<SecureHash, DigestProviderError> {
        if nonce.is_some() {
            return Err(DigestProviderError::UnexpectedNonce { index });
        }
        Ok(self.algorithm.hash_parts(&[self.leaf_prefix.as_slice(), data]))
    }

    fn node_hash(&self, left: &SecureHash, right: &SecureHash) -> SecureHash {
        self.algorithm
            .hash_parts(&[self.node_prefix.as_slice(), left.bytes(), right.bytes()])
    }
}

fn nonce_leaf_hash(
    algorithm: DigestAlgorithm,
    index: usize,
    nonce: Option<&[u8]>,
    data: &[u8],
) -> Result<SecureHash, DigestProviderError> {
    let nonce = nonce.ok_or(DigestProviderError::MissingNonce { index })?;
    Ok(algorithm.hash_parts(&[LEAF_DOMAIN, nonce, data]))
}

fn nonce_node_hash(algorithm: DigestAlgorithm, left: &SecureHash, right: &SecureHash) -> SecureHash {
    algorithm.hash_parts(&[NODE_DOMAIN, left.bytes(), right.bytes()])
}

/// Construction-side provider for component group trees.
///
/// Holds the entropy, so it can only live with a party that has the full
/// transaction.
#[derive(Clone, PartialEq, Eq)]
pub struct NonceHashDigestProvider {
    algorithm: DigestAlgorithm,
    entropy: Vec<u8>,
}

impl NonceHashDigestProvider {
    pub fn new(algorithm: DigestAlgorithm, entropy: Vec<u8>) -> Self {
        Self { algorithm, entropy }
    }

    /// Provider for one component group: `entropy = H(salt ‖ group_be32)`.
    ///
    /// Identical components in different groups therefore get different
    /// nonces.
    pub fn for_component_group(
        algorithm: DigestAlgorithm,
        privacy_salt: &PrivacySalt,
        group_index: usize,
    ) -> Result<Self, DigestProviderError> {
        let group = u32::try_from(group_index)
            .map_err(|_| DigestProviderError::PositionOverflow { index: group_index })?
            .to_be_bytes();
        let entropy = algorithm
            .hash_parts(&[privacy_salt.as_bytes().as_slice(), group.as_slice()])
            .into_bytes();
        Ok(Self::new(algorithm, entropy))
    }

    /// Size proof over `leaves`: every leaf revealed as its opaque leaf hash,
    /// no content.
    pub fn size_proof(&self, leaves: &[Vec<u8>]) -> Result<MerkleProof, MerkleProofError> {
        let tree = MerkleTree::from_leaves(leaves, self).map_err(|e| match e {
            MerkleTreeError::EmptyLeaves => MerkleProofError::NoLeaves,
            MerkleTreeError::Digest(d) => MerkleProofError::Digest(d),
        })?;
        let opaque = tree
            .leaf_hashes()
            .iter()
            .enumerate()
            .map(|(index, hash)| IndexedMerkleLeaf::new(index, Some(hash.bytes().to_vec()), vec![]))
            .collect();
        tree.create_audit_proof(opaque)
    }
}

// Never print the entropy.
impl std::fmt::Debug for NonceHashDigestProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceHashDigestProvider")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl MerkleTreeHashDigestProvider for NonceHashDigestProvider {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    // No nonce past u32::MAX, so such a leaf fails to hash.
    fn leaf_nonce(&self, index: usize) -> Option<Vec<u8>> {
        let position = u32::try_from(index).ok()?.to_be_bytes();
        Some(
            self.algorithm
                .hash_parts(&[self.entropy.as_slice(), position.as_slice()])
                .into_bytes(),
        )
    }

    fn leaf_hash(
        &self,
        index: usize,
        nonce: Option<&[u8]>,
        data: &[u8],
    ) -> Result<SecureHash, DigestProviderError> {
        nonce_leaf_hash(self.algorithm, index, nonce, data)
    }

    fn node_hash(&self, left: &SecureHash, right: &SecureHash) -> SecureHash {
        nonce_node_hash(self.algorithm, left, right)
    }
}

/// Verifies audit proofs: nonces travel inside the proof next to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceVerifyHashDigestProvider {
    algorithm: DigestAlgorithm,
}

impl NonceVerifyHashDigestProvider {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl MerkleTreeHashDigestProvider for NonceVerifyHashDigestProvider {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn leaf_hash(
        &self,
        index: usize,
        nonce: Option<&[u8]>,
        data: &[u8],
    ) -> Result<SecureHash, DigestProviderError> {
        nonce_leaf_hash(self.algorithm, index, nonce, data)
    }

    fn node_hash(&self, left: &SecureHash, right: &SecureHash) -> SecureHash {
        nonce_node_hash(self.algorithm, left, right)
    }
}

/// Verifies size proofs: each leaf's nonce field is the leaf hash itself and
/// the data must be empty. A zero leaf hash is rejected, so padding cannot be
/// passed off as an extra leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceSizeOnlyVerifyHashDigestProvider {
    algorithm: DigestAlgorithm,
}

impl NonceSizeOnlyVerifyHashDigestProvider {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl MerkleTreeHashDigestProvider for NonceSizeOnlyVerifyHashDigestProvider {
    fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn leaf_hash(
        &self,
        index: usize,
        nonce: Option<&[u8]>,
        data: &[u8],
    ) -> Result<SecureHash, DigestProviderError> {
        if !data.is_empty() {
            return Err(DigestProviderError::UnexpectedLeafData { index });
        }
        let hash = nonce.ok_or(DigestProviderError::MissingNonce { index })?;
        let hash = SecureHash::new(self.algorithm, hash.to_vec())
            .map_err(|source| DigestProviderError::InvalidLeafHash { index, source })?;
        // The zero hash is padding, never a real leaf.
        if hash.is_zero() {
            return Err(DigestProviderError::ZeroLeafHash { index });
        }
        Ok(hash)
    }

    fn node_hash(&self, left: &SecureHash, right: &SecureHash) -> SecureHash {
        nonce_node_hash(self.algorithm, left, right)
    }
}
