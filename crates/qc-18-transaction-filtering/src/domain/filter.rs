//! # Component Group Filter Parameters
//!
//! What a caller asks to disclose, per component group.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::value_objects::MerkleProofType;

type Matcher = dyn Fn(Value) -> Result<bool, serde_json::Error> + Send + Sync;

/// Disclosure request for one component group.
#[derive(Debug, Clone)]
pub enum ComponentGroupFilterParameters {
    /// Reveal the leaves selected by `predicate`.
    AuditProof {
        group_index: usize,
        predicate: AuditProofPredicate,
    },
    /// Reveal only how many leaves the group has.
    SizeProof { group_index: usize },
}

impl ComponentGroupFilterParameters {
    /// Audit the leaves at `indices`.
    pub fn audit_by_index(group_index: usize, indices: Vec<usize>) -> Self {
        Self::AuditProof {
            group_index,
            predicate: AuditProofPredicate::Index(indices),
        }
    }

    /// Audit the leaves that decode as `T` and satisfy `predicate`.
    pub fn audit_by_content<T, F>(group_index: usize, predicate: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::AuditProof {
            group_index,
            predicate: AuditProofPredicate::Content(ContentPredicate::new::<T, F>(predicate)),
        }
    }

    pub fn size_proof(group_index: usize) -> Self {
        Self::SizeProof { group_index }
    }

    pub fn group_index(&self) -> usize {
        match self {
            Self::AuditProof { group_index, .. } | Self::SizeProof { group_index } => *group_index,
        }
    }

    pub fn proof_type(&self) -> MerkleProofType {
        match self {
            Self::AuditProof { .. } => MerkleProofType::Audit,
            Self::SizeProof { .. } => MerkleProofType::Size,
        }
    }
}

/// Leaf selection for an audit proof.
#[derive(Debug, Clone)]
pub enum AuditProofPredicate {
    /// Leaves whose decoded content matches.
    Content(ContentPredicate),
    /// Leaves at these positions.
    Index(Vec<usize>),
}

/// A typed predicate applied to components after JSON decoding.
#[derive(Clone)]
pub struct ContentPredicate {
    type_name: &'static str,
    matcher: Arc<Matcher>,
}

impl ContentPredicate {
    pub fn new<T, F>(predicate: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            matcher: Arc::new(move |value| {
                let component: T = serde_json::from_value(value)?;
                Ok(predicate(&component))
            }),
        }
    }

    /// Name of the type components are decoded as.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Decode `value` and apply the predicate.
    pub fn matches(&self, value: Value) -> Result<bool, serde_json::Error> {
        (self.matcher)(value)
    }
}

impl fmt::Debug for ContentPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentPredicate")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
