//! # Merkle Tree
//!
//! A binary hash tree built bottom-up from ordered leaf hashes.
//!
//! ## Invariants
//!
//! - **Odd-width padding**: a level with an odd number of nodes is paired off
//!   with the provider's zero hash. A single leaf therefore becomes a
//!   two-leaf tree.
//! - **Root equality**: two trees are equal iff their roots are equal, so
//!   leaf lists differing only by trailing zero-hash padding compare equal.
//! - **Non-empty**: building from zero leaves is an error.

use std::collections::BTreeSet;

use shared_crypto::SecureHash;

use super::digest::MerkleTreeHashDigestProvider;
use super::proof::{IndexedMerkleLeaf, MerkleProof};
use crate::domain::{MerkleProofError, MerkleTreeError};

/// A binary Merkle tree.
///
/// Stored level by level: `levels[0]` holds the leaf hashes (unpadded), the
/// last level holds the root. A position past the end of a level reads as
/// the zero hash.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<SecureHash>>,
    zero_hash: SecureHash,
}

impl MerkleTree {
    /// Build a tree from leaf hashes.
    ///
    /// ## Algorithm
    ///
    /// 1. Pair each level's nodes left to right with `node_hash`
    /// 2. An unpaired last node is paired with the zero hash
    /// 3. Repeat until one node remains (at least one round, so a single
    ///    leaf is hashed with the zero hash)
    pub fn build<P>(leaf_hashes: Vec<SecureHash>, provider: &P) -> Result<Self, MerkleTreeError>
    where
        P: MerkleTreeHashDigestProvider + ?Sized,
    {
        if leaf_hashes.is_empty() {
            return Err(MerkleTreeError::EmptyLeaves);
        }

        let zero_hash = provider.zero_hash();
        let mut levels = vec![leaf_hashes];

        loop {
            let current = &levels[levels.len() - 1];
            let next: Vec<SecureHash> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => provider.node_hash(left, right),
                    [left] => provider.node_hash(left, &zero_hash),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
            let done = next.len() == 1;
            levels.push(next);
            if done {
                break;
            }
        }

        Ok(Self { levels, zero_hash })
    }

    /// Hash raw leaves with the provider (using its nonces, if any) and build.
    pub fn from_leaves<P>(leaves: &[Vec<u8>], provider: &P) -> Result<Self, MerkleTreeError>
    where
        P: MerkleTreeHashDigestProvider + ?Sized,
    {
        let hashes = leaves
            .iter()
            .enumerate()
            .map(|(index, data)| {
                let nonce = provider.leaf_nonce(index);
                provider.leaf_hash(index, nonce.as_deref(), data)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(hashes, provider)
    }

    /// The root hash.
    pub fn root(&self) -> &SecureHash {
        // build() always leaves a single-node top level
        &self.levels[self.levels.len() - 1][0]
    }

    /// Leaf hashes, without padding.
    pub fn leaf_hashes(&self) -> &[SecureHash] {
        &self.levels[0]
    }

    /// Number of real leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of hashing rounds from the leaves to the root.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    fn node(&self, level: usize, index: usize) -> &SecureHash {
        self.levels[level].get(index).unwrap_or(&self.zero_hash)
    }

    /// Extract a proof revealing `leaves`.
    ///
    /// The caller supplies the revealed leaves as they should appear in the
    /// proof (content, nonce, or opaque hash); only their indices drive which
    /// sibling hashes are included.
    pub fn create_audit_proof(
        &self,
        leaves: Vec<IndexedMerkleLeaf>,
    ) -> Result<MerkleProof, MerkleProofError> {
        if leaves.is_empty() {
            return Err(MerkleProofError::NoLeaves);
        }

        let tree_size = self.leaf_count();
        let mut known = BTreeSet::new();
        for leaf in &leaves {
            if leaf.index >= tree_size {
                return Err(MerkleProofError::LeafIndexOutOfRange {
                    index: leaf.index,
                    tree_size,
                });
            }
            if !known.insert(leaf.index) {
                return Err(MerkleProofError::DuplicateLeafIndex(leaf.index));
            }
        }

        let mut hashes = Vec::new();
        let mut indices: Vec<usize> = known.into_iter().collect();

        // Same walk as MerkleProof::calculate_root, emitting the hashes it consumes
        for level in 0..self.depth() {
            let width = self.levels[level].len();
            let mut parents = Vec::with_capacity(indices.len());
            let mut i = 0;
            while i < indices.len() {
                let index = indices[i];
                let sibling = index ^ 1;
                if indices.get(i + 1) == Some(&sibling) {
                    i += 2;
                } else {
                    if sibling < width {
                        hashes.push(self.node(level, sibling).clone());
                    }
                    i += 1;
                }
                parents.push(index / 2);
            }
            indices = parents;
        }

        let mut leaves = leaves;
        leaves.sort_by_key(|leaf| leaf.index);
        Ok(MerkleProof::new(tree_size, leaves, hashes))
    }
}

impl PartialEq for MerkleTree {
    fn eq(&self, other: &Self) -> bool {
        self.root() == other.root()
    }
}

impl Eq for MerkleTree {}
