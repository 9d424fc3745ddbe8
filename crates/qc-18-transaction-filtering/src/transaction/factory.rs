//! # Filtered Transaction Factory
//!
//! Turns a full transaction plus per-group disclosure requests into a
//! [`FilteredTransaction`].
//!
//! ## Algorithm
//!
//! 1. Validate the requests (unique, existing groups) and force group 0 to an
//!    audit proof of its single leaf
//! 2. Per requested group, select leaves and extract an audit proof, or
//!    extract a size proof
//! 3. Extract a top-level proof revealing the roots of exactly the disclosed
//!    groups

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use super::filtered::{FilteredComponentGroup, FilteredTransaction};
use super::wire::WireTransaction;
use crate::domain::{
    AuditProofPredicate, ComponentGroupFilterParameters, ContentPredicate, FilterError,
    MerkleProofError, MerkleProofType, METADATA_GROUP_INDEX,
};
use crate::merkle::{IndexedMerkleLeaf, MerkleTreeHashDigestProvider};
use crate::ports::JsonMarshallingService;

/// Builds filtered transactions.
#[derive(Clone)]
pub struct FilteredTransactionFactory {
    marshaller: Arc<dyn JsonMarshallingService>,
}

impl FilteredTransactionFactory {
    pub fn new(marshaller: Arc<dyn JsonMarshallingService>) -> Self {
        Self { marshaller }
    }

    /// Filter `transaction` down to the groups named in `filters`.
    ///
    /// Group 0 is always disclosed. An audit request whose predicate selects
    /// nothing leaves its group undisclosed.
    pub fn create(
        &self,
        transaction: &WireTransaction,
        filters: Vec<ComponentGroupFilterParameters>,
    ) -> Result<FilteredTransaction, FilterError> {
        let requests = self.validate(transaction, filters)?;

        let mut filtered_component_groups = BTreeMap::new();
        for (group_index, request) in &requests {
            match self.filter_group(transaction, *group_index, request)? {
                Some(group) => {
                    filtered_component_groups.insert(*group_index, group);
                }
                None => debug!(
                    "[qc-18] Audit request for group {} selected no components; group omitted",
                    group_index
                ),
            }
        }

        let top_level_leaves = filtered_component_groups
            .keys()
            .map(|&group_index| {
                transaction
                    .group_tree(group_index)
                    .map(|tree| IndexedMerkleLeaf::new(group_index, None, tree.root().bytes().to_vec()))
                    .ok_or(FilterError::GroupNotFound {
                        group_index,
                        group_count: transaction.group_count(),
                    })
            })
            .collect::<Result<Vec<_>, FilterError>>()?;
        let component_group_merkle_proof =
            transaction.root_tree().create_audit_proof(top_level_leaves)?;

        debug!(
            "[qc-18] Filtered transaction {}: disclosed groups {:?}",
            transaction.id(),
            filtered_component_groups.keys().collect::<Vec<_>>()
        );

        Ok(FilteredTransaction::new(
            transaction.id().clone(),
            component_group_merkle_proof,
            filtered_component_groups,
            Arc::clone(&self.marshaller),
        ))
    }

    fn validate(
        &self,
        transaction: &WireTransaction,
        filters: Vec<ComponentGroupFilterParameters>,
    ) -> Result<BTreeMap<usize, ComponentGroupFilterParameters>, FilterError> {
        let group_count = transaction.group_count();
        let mut requests = BTreeMap::new();
        for filter in filters {
            let group_index = filter.group_index();
            if group_index >= group_count {
                return Err(FilterError::GroupNotFound {
                    group_index,
                    group_count,
                });
            }
            if requests.insert(group_index, filter).is_some() {
                return Err(FilterError::DuplicateGroupIndex(group_index));
            }
        }

        requests.insert(
            METADATA_GROUP_INDEX,
            ComponentGroupFilterParameters::audit_by_index(METADATA_GROUP_INDEX, vec![0]),
        );
        Ok(requests)
    }

    fn filter_group(
        &self,
        transaction: &WireTransaction,
        group_index: usize,
        request: &ComponentGroupFilterParameters,
    ) -> Result<Option<FilteredComponentGroup>, FilterError> {
        let group_count = transaction.group_count();
        let not_found = FilterError::GroupNotFound {
            group_index,
            group_count,
        };
        let components = transaction
            .component_group(group_index)
            .ok_or_else(|| not_found.clone())?;
        let leaves = transaction
            .group_tree_leaves(group_index)
            .ok_or_else(|| not_found.clone())?;
        let tree = transaction.group_tree(group_index).ok_or(not_found)?;
        let provider = transaction
            .component_group_provider(group_index)
            .map_err(MerkleProofError::from)?;

        // Nothing to hide in an empty group: always reveal its placeholder leaf.
        let selected: BTreeSet<usize> = if components.is_empty() {
            BTreeSet::from([0])
        } else {
            match request {
                ComponentGroupFilterParameters::SizeProof { .. } => {
                    let proof = provider.size_proof(leaves)?;
                    return Ok(Some(FilteredComponentGroup::new(
                        group_index,
                        proof,
                        MerkleProofType::Size,
                    )));
                }
                ComponentGroupFilterParameters::AuditProof { predicate, .. } => {
                    self.select(group_index, components, predicate)?
                }
            }
        };

        if selected.is_empty() {
            return Ok(None);
        }

        let revealed = selected
            .into_iter()
            .map(|index| IndexedMerkleLeaf::new(index, provider.leaf_nonce(index), leaves[index].clone()))
            .collect();
        let proof = tree.create_audit_proof(revealed)?;
        Ok(Some(FilteredComponentGroup::new(
            group_index,
            proof,
            MerkleProofType::Audit,
        )))
    }

    fn select(
        &self,
        group_index: usize,
        components: &[Vec<u8>],
        predicate: &AuditProofPredicate,
    ) -> Result<BTreeSet<usize>, FilterError> {
        match predicate {
            AuditProofPredicate::Index(indices) => {
                let size = components.len();
                if let Some(&index) = indices.iter().find(|&&index| index >= size) {
                    return Err(FilterError::LeafIndexOutOfRange {
                        group_index,
                        index,
                        size,
                    });
                }
                Ok(indices.iter().copied().collect())
            }
            AuditProofPredicate::Content(predicate) => {
                let mut selected = BTreeSet::new();
                for (leaf_index, component) in components.iter().enumerate() {
                    if self.matches(group_index, leaf_index, component, predicate)? {
                        selected.insert(leaf_index);
                    }
                }
                Ok(selected)
            }
        }
    }

    fn matches(
        &self,
        group_index: usize,
        leaf_index: usize,
        component: &[u8],
        predicate: &ContentPredicate,
    ) -> Result<bool, FilterError> {
        let decoding = |message: String| FilterError::ComponentDecoding {
            group_index,
            leaf_index,
            type_name: predicate.type_name(),
            message,
        };
        let value = self
            .marshaller
            .parse(component)
            .map_err(|e| decoding(e.to_string()))?;
        predicate.matches(value).map_err(|e| decoding(e.to_string()))
    }
}

impl std::fmt::Debug for FilteredTransactionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteredTransactionFactory").finish_non_exhaustive()
    }
}
