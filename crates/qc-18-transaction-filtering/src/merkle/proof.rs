//! # Merkle Proofs
//!
//! A compact multi-leaf proof: the revealed leaves plus the sibling hashes
//! needed to climb from them to the root, and nothing else.
//!
//! ## Hash Order
//!
//! Sibling hashes are consumed level by level, bottom-up, and left to right
//! within a level. At each level a revealed node whose sibling is also
//! revealed needs no hash; a node whose sibling falls past the end of an
//! odd-width level is paired with the zero hash; every other node consumes
//! the next hash, which must not itself be the zero hash.

use serde::{Deserialize, Serialize};
use shared_crypto::SecureHash;

use super::digest::MerkleTreeHashDigestProvider;
use crate::domain::MerkleProofError;

/// A revealed leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedMerkleLeaf {
    /// Position among the tree's leaves.
    pub index: usize,
    /// Per-leaf nonce. Present for nonce-family proofs, absent otherwise.
    pub nonce: Option<Vec<u8>>,
    /// Leaf content. Empty in size proofs.
    pub leaf_data: Vec<u8>,
}

impl IndexedMerkleLeaf {
    pub fn new(index: usize, nonce: Option<Vec<u8>>, leaf_data: Vec<u8>) -> Self {
        Self {
            index,
            nonce,
            leaf_data,
        }
    }
}

/// Proof that a set of leaves belongs to a tree with a given root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Number of real leaves in the tree (before padding).
    pub tree_size: usize,
    /// Revealed leaves.
    pub leaves: Vec<IndexedMerkleLeaf>,
    /// Sibling hashes, in consumption order.
    pub hashes: Vec<SecureHash>,
}

impl MerkleProof {
    pub fn new(tree_size: usize, leaves: Vec<IndexedMerkleLeaf>, hashes: Vec<SecureHash>) -> Self {
        Self {
            tree_size,
            leaves,
            hashes,
        }
    }

    /// Revealed leaves in index order.
    pub fn sorted_leaves(&self) -> Vec<&IndexedMerkleLeaf> {
        let mut leaves: Vec<&IndexedMerkleLeaf> = self.leaves.iter().collect();
        leaves.sort_by_key(|leaf| leaf.index);
        leaves
    }

    /// The revealed leaf at `index`, if any.
    pub fn leaf(&self, index: usize) -> Option<&IndexedMerkleLeaf> {
        self.leaves.iter().find(|leaf| leaf.index == index)
    }

    /// Recompute the root this proof commits to.
    ///
    /// # Algorithm
    ///
    /// 1. Hash every revealed leaf with the provider
    /// 2. Pair nodes upward: revealed sibling, zero-hash padding, or the next
    ///    proof hash
    /// 3. Stop when the level width reaches one; every hash must be consumed
    pub fn calculate_root<P>(&self, provider: &P) -> Result<SecureHash, MerkleProofError>
    where
        P: MerkleTreeHashDigestProvider + ?Sized,
    {
        if self.tree_size == 0 {
            return Err(MerkleProofError::EmptyTree);
        }
        if self.leaves.is_empty() {
            return Err(MerkleProofError::NoLeaves);
        }

        let sorted = self.sorted_leaves();
        let mut nodes: Vec<(usize, SecureHash)> = Vec::with_capacity(sorted.len());
        for leaf in sorted {
            if leaf.index >= self.tree_size {
                return Err(MerkleProofError::LeafIndexOutOfRange {
                    index: leaf.index,
                    tree_size: self.tree_size,
                });
            }
            if nodes.last().is_some_and(|(prev, _)| *prev == leaf.index) {
                return Err(MerkleProofError::DuplicateLeafIndex(leaf.index));
            }
            let hash = provider.leaf_hash(leaf.index, leaf.nonce.as_deref(), &leaf.leaf_data)?;
            nodes.push((leaf.index, hash));
        }

        let zero = provider.zero_hash();
        let mut hashes = self.hashes.iter();
        let mut width = self.tree_size;

        loop {
            let mut parents = Vec::with_capacity(nodes.len());
            let mut i = 0;
            while i < nodes.len() {
                let index = nodes[i].0;
                let hash = &nodes[i].1;
                let sibling = index ^ 1;

                if let Some((next_index, next_hash)) = nodes.get(i + 1) {
                    if *next_index == sibling {
                        parents.push((index / 2, provider.node_hash(hash, next_hash)));
                        i += 2;
                        continue;
                    }
                }

                let sibling_hash = if sibling >= width {
                    &zero
                } else {
                    let next = hashes.next().ok_or(MerkleProofError::MissingHashes)?;
                    // Real nodes never hash to zero; a zero here stands in
                    // for padding under an inflated tree size.
                    if next.is_zero() {
                        return Err(MerkleProofError::ZeroSiblingHash);
                    }
                    next
                };
                let parent = if index % 2 == 0 {
                    provider.node_hash(hash, sibling_hash)
                } else {
                    provider.node_hash(sibling_hash, hash)
                };
                parents.push((index / 2, parent));
                i += 1;
            }

            nodes = parents;
            width = width / 2 + width % 2;
            if width == 1 {
                break;
            }
        }

        let unused = hashes.count();
        if unused > 0 {
            return Err(MerkleProofError::UnusedHashes { unused });
        }

        nodes
            .pop()
            .map(|(_, root)| root)
            .ok_or(MerkleProofError::NoLeaves)
    }

    /// Check the proof against an expected root.
    pub fn verify<P>(&self, expected_root: &SecureHash, provider: &P) -> bool
    where
        P: MerkleTreeHashDigestProvider + ?Sized,
    {
        provider.verify(self, expected_root)
    }
}
