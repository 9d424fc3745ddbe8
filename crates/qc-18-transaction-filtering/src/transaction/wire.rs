//! # Wire Transaction
//!
//! The full transaction as its participants hold it: every component group in
//! plaintext plus the privacy salt. Its id is the root of the top-level tree
//! over the component group roots.
//!
//! ```text
//!                       id
//!                 ┌──────┴──────┐
//!              node(..)      node(..)        Tweakable provider
//!             ┌───┴───┐     ┌───┴───┐
//!          root(g0) root(g1) root(g2) zero
//!             │
//!      nonce tree over group 0's components    Nonce provider, entropy per group
//! ```

use shared_crypto::SecureHash;
use tracing::debug;

use crate::config::TransactionDigestConfig;
use crate::domain::{
    DigestProviderError, MerkleDigestSettings, MerkleTreeError, PrivacySalt, TransactionMetadata,
    WireTransactionError, METADATA_GROUP_INDEX,
};
use crate::merkle::{MerkleTree, NonceHashDigestProvider};
use crate::ports::JsonMarshallingService;

// An empty group is hashed as a single empty component.
static EMPTY_GROUP_LEAVES: [Vec<u8>; 1] = [Vec::new()];

/// A complete transaction.
#[derive(Debug, Clone)]
pub struct WireTransaction {
    privacy_salt: PrivacySalt,
    component_groups: Vec<Vec<Vec<u8>>>,
    metadata: TransactionMetadata,
    digest_settings: MerkleDigestSettings,
    group_trees: Vec<MerkleTree>,
    root_tree: MerkleTree,
}

impl WireTransaction {
    /// Build from raw component groups. Group 0 must hold exactly one
    /// component: the JSON metadata naming the digest settings.
    pub fn new(
        privacy_salt: PrivacySalt,
        component_groups: Vec<Vec<Vec<u8>>>,
        marshaller: &dyn JsonMarshallingService,
    ) -> Result<Self, WireTransactionError> {
        let metadata_group = component_groups
            .get(METADATA_GROUP_INDEX)
            .ok_or(WireTransactionError::NoComponentGroups)?;
        if metadata_group.len() != 1 {
            return Err(WireTransactionError::MetadataGroupShape {
                count: metadata_group.len(),
            });
        }

        let metadata = TransactionMetadata::from_bytes(marshaller, &metadata_group[0])?;
        let digest_settings = metadata.merkle_digest_settings()?;

        let group_trees = component_groups
            .iter()
            .enumerate()
            .map(|(group_index, group)| -> Result<MerkleTree, MerkleTreeError> {
                let provider = digest_settings.component_group_provider(&privacy_salt, group_index)?;
                MerkleTree::from_leaves(tree_leaves(group), &provider)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let group_roots: Vec<Vec<u8>> = group_trees
            .iter()
            .map(|tree| tree.root().bytes().to_vec())
            .collect();
        let root_tree = MerkleTree::from_leaves(&group_roots, &digest_settings.root_provider())?;

        debug!(
            "[qc-18] Built transaction {} with {} component groups",
            root_tree.root(),
            component_groups.len()
        );

        Ok(Self {
            privacy_salt,
            component_groups,
            metadata,
            digest_settings,
            group_trees,
            root_tree,
        })
    }

    /// Build with metadata generated from `config`; `groups` become groups
    /// 1, 2, ...
    pub fn with_config(
        config: &TransactionDigestConfig,
        privacy_salt: PrivacySalt,
        groups: Vec<Vec<Vec<u8>>>,
        marshaller: &dyn JsonMarshallingService,
    ) -> Result<Self, WireTransactionError> {
        let metadata = TransactionMetadata::from_config(config).to_bytes(marshaller)?;
        let mut component_groups = Vec::with_capacity(groups.len() + 1);
        component_groups.push(vec![metadata]);
        component_groups.extend(groups);
        Self::new(privacy_salt, component_groups, marshaller)
    }

    /// Transaction id: the top-level tree root.
    pub fn id(&self) -> &SecureHash {
        self.root_tree.root()
    }

    pub fn privacy_salt(&self) -> &PrivacySalt {
        &self.privacy_salt
    }

    pub fn metadata(&self) -> &TransactionMetadata {
        &self.metadata
    }

    pub fn digest_settings(&self) -> &MerkleDigestSettings {
        &self.digest_settings
    }

    pub fn component_groups(&self) -> &[Vec<Vec<u8>>] {
        &self.component_groups
    }

    pub fn component_group(&self, group_index: usize) -> Option<&[Vec<u8>]> {
        self.component_groups.get(group_index).map(Vec::as_slice)
    }

    pub fn group_count(&self) -> usize {
        self.component_groups.len()
    }

    /// Leaves the group tree was built from (a single empty leaf for an
    /// empty group).
    pub fn group_tree_leaves(&self, group_index: usize) -> Option<&[Vec<u8>]> {
        self.component_groups
            .get(group_index)
            .map(|group| tree_leaves(group))
    }

    pub fn group_tree(&self, group_index: usize) -> Option<&MerkleTree> {
        self.group_trees.get(group_index)
    }

    pub fn root_tree(&self) -> &MerkleTree {
        &self.root_tree
    }

    /// Construction provider for a group's tree.
    pub fn component_group_provider(
        &self,
        group_index: usize,
    ) -> Result<NonceHashDigestProvider, DigestProviderError> {
        self.digest_settings
            .component_group_provider(&self.privacy_salt, group_index)
    }
}

fn tree_leaves(group: &[Vec<u8>]) -> &[Vec<u8>] {
    if group.is_empty() {
        &EMPTY_GROUP_LEAVES
    } else {
        group
    }
}
