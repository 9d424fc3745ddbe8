//! # Transaction Metadata
//!
//! Component group 0 holds a JSON document describing how the transaction
//! was hashed. A recipient has to read it before it can check anything, yet
//! cannot trust it until the top-level proof is checked with it. The two
//! phases are separate types:
//!
//! ```text
//! metadata JSON ──parse──→ UntrustedDigestSettings ──bind(proof, id)──→ TrustedDigestSettings
//!                          (root provider only)                          (group providers)
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use shared_crypto::{DigestAlgorithm, SecureHash};

use super::errors::{DigestProviderError, MetadataError};
use super::value_objects::{MerkleProofType, PrivacySalt};
use crate::config::TransactionDigestConfig;
use crate::merkle::{
    MerkleProof, MerkleTreeHashDigestProvider, NonceHashDigestProvider,
    NonceSizeOnlyVerifyHashDigestProvider, NonceVerifyHashDigestProvider,
    TweakableHashDigestProvider,
};
use crate::ports::JsonMarshallingService;

/// Typed view of component group 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    pub ledger_model: String,
    pub ledger_version: u32,
    pub digest_settings: DigestSettings,
}

impl TransactionMetadata {
    pub fn from_config(config: &TransactionDigestConfig) -> Self {
        Self {
            ledger_model: config.ledger_model.clone(),
            ledger_version: config.ledger_version,
            digest_settings: DigestSettings {
                root_merkle_tree_digest_algorithm_name: config.root_digest_algorithm.name().to_string(),
                root_merkle_tree_digest_options_leaf_prefix_b64: STANDARD.encode(&config.root_leaf_prefix),
                root_merkle_tree_digest_options_node_prefix_b64: STANDARD.encode(&config.root_node_prefix),
                component_group_merkle_tree_digest_algorithm_name: config
                    .component_group_digest_algorithm
                    .name()
                    .to_string(),
            },
        }
    }

    /// Decode metadata bytes through the marshalling port.
    pub fn from_bytes(
        marshaller: &dyn JsonMarshallingService,
        bytes: &[u8],
    ) -> Result<Self, MetadataError> {
        let value = marshaller.parse(bytes)?;
        serde_json::from_value(value).map_err(|e| MetadataError::InvalidMetadata(e.to_string()))
    }

    /// Encode metadata through the marshalling port.
    pub fn to_bytes(&self, marshaller: &dyn JsonMarshallingService) -> Result<Vec<u8>, MetadataError> {
        let value =
            serde_json::to_value(self).map_err(|e| MetadataError::InvalidMetadata(e.to_string()))?;
        Ok(marshaller.format(&value)?)
    }

    /// Parse the digest settings.
    pub fn merkle_digest_settings(&self) -> Result<MerkleDigestSettings, MetadataError> {
        self.digest_settings.parse()
    }
}

/// Digest settings as written in metadata (names and base64 prefixes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestSettings {
    pub root_merkle_tree_digest_algorithm_name: String,
    pub root_merkle_tree_digest_options_leaf_prefix_b64: String,
    pub root_merkle_tree_digest_options_node_prefix_b64: String,
    pub component_group_merkle_tree_digest_algorithm_name: String,
}

impl DigestSettings {
    pub fn parse(&self) -> Result<MerkleDigestSettings, MetadataError> {
        let root_algorithm: DigestAlgorithm = self.root_merkle_tree_digest_algorithm_name.parse()?;
        let component_group_algorithm: DigestAlgorithm =
            self.component_group_merkle_tree_digest_algorithm_name.parse()?;
        let root_leaf_prefix = decode_prefix(
            "rootMerkleTreeDigestOptionsLeafPrefixB64",
            &self.root_merkle_tree_digest_options_leaf_prefix_b64,
        )?;
        let root_node_prefix = decode_prefix(
            "rootMerkleTreeDigestOptionsNodePrefixB64",
            &self.root_merkle_tree_digest_options_node_prefix_b64,
        )?;
        if root_leaf_prefix == root_node_prefix {
            return Err(MetadataError::IdenticalPrefixes);
        }

        Ok(MerkleDigestSettings {
            root_algorithm,
            root_leaf_prefix,
            root_node_prefix,
            component_group_algorithm,
        })
    }
}

fn decode_prefix(field: &'static str, encoded: &str) -> Result<Vec<u8>, MetadataError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| MetadataError::InvalidPrefix {
            field,
            message: e.to_string(),
        })
}

/// Parsed digest settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleDigestSettings {
    root_algorithm: DigestAlgorithm,
    root_leaf_prefix: Vec<u8>,
    root_node_prefix: Vec<u8>,
    component_group_algorithm: DigestAlgorithm,
}

impl MerkleDigestSettings {
    pub fn root_algorithm(&self) -> DigestAlgorithm {
        self.root_algorithm
    }

    pub fn component_group_algorithm(&self) -> DigestAlgorithm {
        self.component_group_algorithm
    }

    /// Provider for the top-level tree.
    pub fn root_provider(&self) -> TweakableHashDigestProvider {
        TweakableHashDigestProvider::new(
            self.root_algorithm,
            self.root_leaf_prefix.clone(),
            self.root_node_prefix.clone(),
        )
    }

    /// Construction provider for one component group.
    pub fn component_group_provider(
        &self,
        privacy_salt: &PrivacySalt,
        group_index: usize,
    ) -> Result<NonceHashDigestProvider, DigestProviderError> {
        NonceHashDigestProvider::for_component_group(
            self.component_group_algorithm,
            privacy_salt,
            group_index,
        )
    }
}

/// Settings read from metadata that has not been bound to the id yet.
///
/// The only thing it can do is check the top-level proof.
#[derive(Debug, Clone)]
pub struct UntrustedDigestSettings(MerkleDigestSettings);

impl UntrustedDigestSettings {
    pub fn new(settings: MerkleDigestSettings) -> Self {
        Self(settings)
    }

    /// Check the top-level proof against `id` using these settings.
    ///
    /// Success proves the metadata that produced them is part of the
    /// transaction `id` names.
    pub fn bind(self, top_level_proof: &MerkleProof, id: &SecureHash) -> Option<TrustedDigestSettings> {
        if self.0.root_provider().verify(top_level_proof, id) {
            Some(TrustedDigestSettings(self.0))
        } else {
            None
        }
    }
}

/// Settings bound to the transaction id.
#[derive(Debug, Clone)]
pub struct TrustedDigestSettings(MerkleDigestSettings);

impl TrustedDigestSettings {
    pub fn component_group_algorithm(&self) -> DigestAlgorithm {
        self.0.component_group_algorithm
    }

    /// Verification provider for a component group proof.
    pub fn verify_provider(&self, proof_type: MerkleProofType) -> Box<dyn MerkleTreeHashDigestProvider> {
        match proof_type {
            MerkleProofType::Audit => {
                Box::new(NonceVerifyHashDigestProvider::new(self.0.component_group_algorithm))
            }
            MerkleProofType::Size => Box::new(NonceSizeOnlyVerifyHashDigestProvider::new(
                self.0.component_group_algorithm,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SerdeJsonMarshallingService;
    use crate::merkle::{IndexedMerkleLeaf, MerkleTree};

    #[test]
    fn test_json_keys() {
        let metadata = TransactionMetadata::from_config(&TransactionDigestConfig::default());
        let value = serde_json::to_value(&metadata).unwrap();
        let settings = &value["digestSettings"];

        assert_eq!(value["ledgerModel"], "quantum-chain.utxo");
        assert_eq!(settings["rootMerkleTreeDigestAlgorithmName"], "SHA-256");
        assert_eq!(settings["rootMerkleTreeDigestOptionsLeafPrefixB64"], "AA==");
        assert_eq!(settings["rootMerkleTreeDigestOptionsNodePrefixB64"], "AQ==");
        assert_eq!(settings["componentGroupMerkleTreeDigestAlgorithmName"], "SHA-256");
    }

    #[test]
    fn test_bytes_round_trip_through_marshaller() {
        let marshaller = SerdeJsonMarshallingService::new();
        let metadata = TransactionMetadata::from_config(&TransactionDigestConfig::with_algorithms(
            DigestAlgorithm::Sha512,
            DigestAlgorithm::Blake3,
        ));
        let bytes = metadata.to_bytes(&marshaller).unwrap();
        let parsed = TransactionMetadata::from_bytes(&marshaller, &bytes).unwrap();
        assert_eq!(parsed, metadata);

        let settings = parsed.merkle_digest_settings().unwrap();
        assert_eq!(settings.root_algorithm(), DigestAlgorithm::Sha512);
        assert_eq!(settings.component_group_algorithm(), DigestAlgorithm::Blake3);
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let mut metadata = TransactionMetadata::from_config(&TransactionDigestConfig::default());
        metadata.digest_settings.root_merkle_tree_digest_algorithm_name = "MD5".to_string();
        assert!(matches!(
            metadata.merkle_digest_settings(),
            Err(MetadataError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_bad_base64_rejected() {
        let mut metadata = TransactionMetadata::from_config(&TransactionDigestConfig::default());
        metadata.digest_settings.root_merkle_tree_digest_options_node_prefix_b64 = "***".to_string();
        assert!(matches!(
            metadata.merkle_digest_settings(),
            Err(MetadataError::InvalidPrefix {
                field: "rootMerkleTreeDigestOptionsNodePrefixB64",
                ..
            })
        ));
    }

    #[test]
    fn test_identical_prefixes_rejected() {
        let mut metadata = TransactionMetadata::from_config(&TransactionDigestConfig::default());
        metadata.digest_settings.root_merkle_tree_digest_options_node_prefix_b64 = "AA==".to_string();
        assert_eq!(
            metadata.merkle_digest_settings(),
            Err(MetadataError::IdenticalPrefixes)
        );
    }

    #[test]
    fn test_missing_field_rejected() {
        let marshaller = SerdeJsonMarshallingService::new();
        let result = TransactionMetadata::from_bytes(&marshaller, br#"{"ledgerModel":"x"}"#);
        assert!(matches!(result, Err(MetadataError::InvalidMetadata(_))));
    }

    #[test]
    fn test_bind_requires_matching_root() {
        let settings = TransactionMetadata::from_config(&TransactionDigestConfig::default())
            .merkle_digest_settings()
            .unwrap();
        let provider = settings.root_provider();
        let leaves = vec![b"group-0-root".to_vec(), b"group-1-root".to_vec()];
        let tree = MerkleTree::from_leaves(&leaves, &provider).unwrap();
        let proof = tree
            .create_audit_proof(vec![IndexedMerkleLeaf::new(0, None, leaves[0].clone())])
            .unwrap();

        let bound = UntrustedDigestSettings::new(settings.clone()).bind(&proof, tree.root());
        assert!(bound.is_some());

        let wrong_id = DigestAlgorithm::Sha256.hash(b"some other transaction");
        let unbound = UntrustedDigestSettings::new(settings).bind(&proof, &wrong_id);
        assert!(unbound.is_none());
    }
}
