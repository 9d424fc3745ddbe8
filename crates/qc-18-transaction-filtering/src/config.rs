//! # Transaction Digest Configuration
//!
//! Digest settings written into the metadata of newly built transactions.
//! Verification never reads this: a received transaction is checked with the
//! settings its own metadata declares.

use serde::{Deserialize, Serialize};
use shared_crypto::DigestAlgorithm;

/// Default ledger model tag.
pub const DEFAULT_LEDGER_MODEL: &str = "quantum-chain.utxo";

/// Default ledger version.
pub const DEFAULT_LEDGER_VERSION: u32 = 1;

/// Default top-level leaf prefix (RFC 6962 style).
pub const DEFAULT_ROOT_LEAF_PREFIX: &[u8] = &[0x00];

/// Default top-level node prefix (RFC 6962 style).
pub const DEFAULT_ROOT_NODE_PREFIX: &[u8] = &[0x01];

/// Digest configuration for new transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDigestConfig {
    /// Ledger model tag recorded in metadata.
    pub ledger_model: String,

    /// Ledger version recorded in metadata.
    pub ledger_version: u32,

    /// Algorithm for the top-level tree (and therefore the transaction id).
    pub root_digest_algorithm: DigestAlgorithm,

    /// Top-level leaf prefix. Must differ from the node prefix.
    pub root_leaf_prefix: Vec<u8>,

    /// Top-level node prefix.
    pub root_node_prefix: Vec<u8>,

    /// Algorithm for every component group tree.
    pub component_group_digest_algorithm: DigestAlgorithm,
}

impl Default for TransactionDigestConfig {
    fn default() -> Self {
        Self {
            ledger_model: DEFAULT_LEDGER_MODEL.to_string(),
            ledger_version: DEFAULT_LEDGER_VERSION,
            root_digest_algorithm: DigestAlgorithm::Sha256,
            root_leaf_prefix: DEFAULT_ROOT_LEAF_PREFIX.to_vec(),
            root_node_prefix: DEFAULT_ROOT_NODE_PREFIX.to_vec(),
            component_group_digest_algorithm: DigestAlgorithm::Sha256,
        }
    }
}

impl TransactionDigestConfig {
    /// Config for tests: default algorithms, distinct ledger model tag.
    pub fn for_testing() -> Self {
        Self {
            ledger_model: "quantum-chain.test".to_string(),
            ..Self::default()
        }
    }

    /// Same settings with different algorithms.
    pub fn with_algorithms(root: DigestAlgorithm, component_group: DigestAlgorithm) -> Self {
        Self {
            root_digest_algorithm: root,
            component_group_digest_algorithm: component_group,
            ..Self::default()
        }
    }
}
