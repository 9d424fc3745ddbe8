//! # Filtered Transaction
//!
//! A transaction with only some component groups disclosed, plus the proofs
//! binding them to the transaction id.
//!
//! ## Verification Pipeline
//!
//! Checks run in order and stop at the first failure:
//!
//! 1. The top-level proof reveals at least one leaf
//! 2. Exactly one revealed top-level leaf has index 0 (metadata)
//! 3. Revealed top-level indices equal the disclosed group ordinals
//! 4. Group 0 has tree size 1 and one leaf
//! 5. Metadata is parsed (untrusted), then bound by checking the top-level
//!    proof against the id with the settings it declares
//! 6. Every disclosed group proof reaches its top-level leaf hash

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use shared_crypto::SecureHash;
use tracing::{debug, warn};

use crate::domain::{
    FilteredTransactionVerificationError, MerkleProofType, MetadataError, TransactionMetadata,
    TrustedDigestSettings, UntrustedDigestSettings, VerificationFailure, METADATA_GROUP_INDEX,
};
use crate::merkle::MerkleProof;
use crate::ports::JsonMarshallingService;

/// One disclosed component group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredComponentGroup {
    /// Position of the group in the transaction.
    pub ordinal: usize,
    pub merkle_proof: MerkleProof,
    pub merkle_proof_type: MerkleProofType,
}

impl FilteredComponentGroup {
    pub fn new(ordinal: usize, merkle_proof: MerkleProof, merkle_proof_type: MerkleProofType) -> Self {
        Self {
            ordinal,
            merkle_proof,
            merkle_proof_type,
        }
    }

    /// Shape of the placeholder proof an empty group produces.
    fn is_empty_placeholder(&self) -> bool {
        let proof = &self.merkle_proof;
        proof.tree_size == 1 && proof.leaves.len() == 1 && proof.leaves[0].leaf_data.is_empty()
    }
}

/// Immutable filtered view of a transaction.
#[derive(Clone)]
pub struct FilteredTransaction {
    id: SecureHash,
    component_group_merkle_proof: MerkleProof,
    filtered_component_groups: BTreeMap<usize, FilteredComponentGroup>,
    marshaller: Arc<dyn JsonMarshallingService>,
    metadata: OnceLock<Result<TransactionMetadata, MetadataError>>,
}

impl FilteredTransaction {
    /// Assemble a filtered transaction. Nothing is checked until
    /// [`FilteredTransaction::verify`].
    pub fn new(
        id: SecureHash,
        component_group_merkle_proof: MerkleProof,
        filtered_component_groups: BTreeMap<usize, FilteredComponentGroup>,
        marshaller: Arc<dyn JsonMarshallingService>,
    ) -> Self {
        Self {
            id,
            component_group_merkle_proof,
            filtered_component_groups,
            marshaller,
            metadata: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &SecureHash {
        &self.id
    }

    /// Top-level proof over the component group roots.
    pub fn component_group_merkle_proof(&self) -> &MerkleProof {
        &self.component_group_merkle_proof
    }

    pub fn filtered_component_groups(&self) -> &BTreeMap<usize, FilteredComponentGroup> {
        &self.filtered_component_groups
    }

    pub fn filtered_component_group(&self, ordinal: usize) -> Option<&FilteredComponentGroup> {
        self.filtered_component_groups.get(&ordinal)
    }

    /// Metadata read from group 0, parsed on first access.
    ///
    /// Untrusted until [`FilteredTransaction::verify`] succeeds.
    pub fn metadata(&self) -> Result<&TransactionMetadata, MetadataError> {
        self.metadata
            .get_or_init(|| self.parse_metadata())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn parse_metadata(&self) -> Result<TransactionMetadata, MetadataError> {
        let group = self
            .filtered_component_groups
            .get(&METADATA_GROUP_INDEX)
            .ok_or(MetadataError::MissingMetadataGroup)?;
        match group.merkle_proof.leaves.as_slice() {
            [leaf] => TransactionMetadata::from_bytes(self.marshaller.as_ref(), &leaf.leaf_data),
            leaves => Err(MetadataError::MalformedMetadataGroup {
                leaves: leaves.len(),
            }),
        }
    }

    /// Check every disclosed group is bound to the transaction id.
    pub fn verify(&self) -> Result<(), FilteredTransactionVerificationError> {
        match self.run_checks() {
            Ok(()) => {
                debug!(
                    "[qc-18] Filtered transaction {} verified ({} groups disclosed)",
                    self.id,
                    self.filtered_component_groups.len()
                );
                Ok(())
            }
            Err(reason) => {
                warn!("[qc-18] Filtered transaction {} rejected: {}", self.id, reason);
                Err(self.failure(reason))
            }
        }
    }

    fn failure(&self, reason: VerificationFailure) -> FilteredTransactionVerificationError {
        FilteredTransactionVerificationError {
            transaction_id: self.id.clone(),
            reason,
        }
    }

    fn run_checks(&self) -> Result<(), VerificationFailure> {
        let top_level = &self.component_group_merkle_proof;

        if top_level.leaves.is_empty() {
            return Err(VerificationFailure::NoTopLevelLeaves);
        }

        let metadata_leaves = top_level
            .leaves
            .iter()
            .filter(|leaf| leaf.index == METADATA_GROUP_INDEX)
            .count();
        if metadata_leaves != 1 {
            return Err(VerificationFailure::MetadataLeafCount {
                count: metadata_leaves,
            });
        }

        let proof_indexes: BTreeSet<usize> = top_level.leaves.iter().map(|leaf| leaf.index).collect();
        let group_indexes: BTreeSet<usize> = self.filtered_component_groups.keys().copied().collect();
        if proof_indexes != group_indexes {
            return Err(VerificationFailure::IndexMismatch {
                proof_indexes: proof_indexes.into_iter().collect(),
                group_indexes: group_indexes.into_iter().collect(),
            });
        }
        for (key, group) in &self.filtered_component_groups {
            if group.ordinal != *key {
                return Err(VerificationFailure::OrdinalMismatch {
                    key: *key,
                    ordinal: group.ordinal,
                });
            }
        }

        let metadata_group = self
            .filtered_component_groups
            .get(&METADATA_GROUP_INDEX)
            .ok_or(VerificationFailure::MissingMetadataGroup)?;
        let metadata_proof = &metadata_group.merkle_proof;
        if metadata_proof.tree_size != 1 || metadata_proof.leaves.len() != 1 {
            return Err(VerificationFailure::MalformedMetadataGroup {
                tree_size: metadata_proof.tree_size,
                leaves: metadata_proof.leaves.len(),
            });
        }

        let untrusted = self
            .metadata()
            .and_then(TransactionMetadata::merkle_digest_settings)
            .map(UntrustedDigestSettings::new)
            .map_err(VerificationFailure::UnreadableMetadata)?;
        let trusted = untrusted
            .bind(top_level, &self.id)
            .ok_or(VerificationFailure::TopLevelProofUnverified)?;

        // Group 0 is checked too, even when it is the only group disclosed.
        self.filtered_component_groups
            .values()
            .try_for_each(|group| self.verify_group(&trusted, group))
    }

    fn verify_group(
        &self,
        settings: &TrustedDigestSettings,
        group: &FilteredComponentGroup,
    ) -> Result<(), VerificationFailure> {
        let unverified = VerificationFailure::ComponentGroupUnverified {
            ordinal: group.ordinal,
            proof_type: group.merkle_proof_type,
        };

        let root_leaf = self
            .component_group_merkle_proof
            .leaf(group.ordinal)
            .ok_or_else(|| unverified.clone())?;
        let expected_root =
            SecureHash::new(settings.component_group_algorithm(), root_leaf.leaf_data.clone())
                .map_err(|_| unverified.clone())?;

        let declared = settings
            .verify_provider(group.merkle_proof_type)
            .verify(&group.merkle_proof, &expected_root);
        // An empty group's placeholder is always an audit proof, whatever
        // type it declares.
        let placeholder = group.merkle_proof_type == MerkleProofType::Size
            && group.is_empty_placeholder()
            && settings
                .verify_provider(MerkleProofType::Audit)
                .verify(&group.merkle_proof, &expected_root);

        if declared || placeholder {
            Ok(())
        } else {
            Err(unverified)
        }
    }

    /// Revealed component bytes of a group, in index order.
    ///
    /// `None` when the group is not disclosed. Leaves of a size proof carry
    /// no content and come back empty.
    pub fn component_group_content(&self, ordinal: usize) -> Option<Vec<&[u8]>> {
        let group = self.filtered_component_groups.get(&ordinal)?;
        Some(
            group
                .merkle_proof
                .sorted_leaves()
                .into_iter()
                .map(|leaf| leaf.leaf_data.as_slice())
                .collect(),
        )
    }

    /// Component count a disclosed group's proof commits to.
    ///
    /// A size proof or an audit proof revealing the last component pins the
    /// count. An audit proof hiding the tail does not: past its last
    /// revealed leaf, padding and real leaves hash alike. Such a group
    /// reports `None`, as does an undisclosed one.
    pub fn component_group_size(&self, ordinal: usize) -> Option<usize> {
        let group = self.filtered_component_groups.get(&ordinal)?;
        let proof = &group.merkle_proof;
        let pinned = group.merkle_proof_type == MerkleProofType::Size
            || proof.leaves.iter().any(|leaf| leaf.index + 1 == proof.tree_size);
        pinned.then_some(proof.tree_size)
    }

    pub fn proof_type(&self, ordinal: usize) -> Option<MerkleProofType> {
        self.filtered_component_groups
            .get(&ordinal)
            .map(|group| group.merkle_proof_type)
    }

    /// Fails unless the group is disclosed by an audit proof revealing every
    /// component.
    pub fn check_all_components_visible(
        &self,
        ordinal: usize,
    ) -> Result<(), FilteredTransactionVerificationError> {
        let group = self
            .filtered_component_groups
            .get(&ordinal)
            .ok_or_else(|| self.failure(VerificationFailure::ComponentGroupNotDisclosed { ordinal }))?;
        let proof = &group.merkle_proof;
        if group.merkle_proof_type != MerkleProofType::Audit || proof.leaves.len() != proof.tree_size {
            return Err(self.failure(VerificationFailure::ComponentsNotVisible {
                ordinal,
                tree_size: proof.tree_size,
            }));
        }
        Ok(())
    }
}

impl fmt::Debug for FilteredTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredTransaction")
            .field("id", &self.id)
            .field("component_group_merkle_proof", &self.component_group_merkle_proof)
            .field("filtered_component_groups", &self.filtered_component_groups)
            .finish_non_exhaustive()
    }
}
