//! # Selective Disclosure Tests for Transaction Filtering (qc-18)
//!
//! End-to-end behaviour of building, filtering and verifying transactions.
//!
//! ## Test Categories
//!
//! 1. **Disclosure** - audit by index and by content, size proofs
//! 2. **Algorithms** - every digest algorithm at both tree levels
//! 3. **Properties** - random audit subsets always verify

use std::sync::Arc;

use proptest::prelude::*;
use qc_18_transaction_filtering::{
    ComponentGroupFilterParameters, DigestAlgorithm, FilteredTransaction,
    FilteredTransactionFactory, JsonMarshallingService, MerkleProofType, PrivacySalt,
    SerdeJsonMarshallingService, TransactionDigestConfig, WireTransaction,
};
use serde::Deserialize;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn marshaller() -> Arc<dyn JsonMarshallingService> {
    Arc::new(SerdeJsonMarshallingService::new())
}

fn build(config: &TransactionDigestConfig, groups: Vec<Vec<Vec<u8>>>) -> WireTransaction {
    WireTransaction::with_config(config, PrivacySalt::random(), groups, &SerdeJsonMarshallingService::new())
        .unwrap()
}

/// metadata(1), commands(1: "cmd"), outputs(3: "out0", "out1", "out2")
fn commands_and_outputs() -> WireTransaction {
    build(
        &TransactionDigestConfig::default(),
        vec![
            vec![b"\"cmd\"".to_vec()],
            vec![b"\"out0\"".to_vec(), b"\"out1\"".to_vec(), b"\"out2\"".to_vec()],
        ],
    )
}

fn filter(tx: &WireTransaction, params: Vec<ComponentGroupFilterParameters>) -> FilteredTransaction {
    FilteredTransactionFactory::new(marshaller()).create(tx, params).unwrap()
}

// =============================================================================
// DISCLOSURE
// =============================================================================

#[test]
fn test_metadata_only_filtered_transaction_verifies() {
    init_tracing();
    let tx = commands_and_outputs();
    let ftx = filter(&tx, vec![]);

    assert_eq!(ftx.id(), tx.id());
    assert_eq!(ftx.filtered_component_groups().len(), 1);
    assert!(ftx.verify().is_ok());
    assert_eq!(ftx.metadata().unwrap(), tx.metadata());
}

#[test]
fn test_selective_audit_of_outputs() {
    init_tracing();
    let tx = commands_and_outputs();
    let ftx = filter(
        &tx,
        vec![ComponentGroupFilterParameters::audit_by_index(2, vec![0, 2])],
    );

    let keys: Vec<usize> = ftx.filtered_component_groups().keys().copied().collect();
    assert_eq!(keys, vec![0, 2]);
    assert_eq!(
        ftx.component_group_content(2).unwrap(),
        vec![&b"\"out0\""[..], &b"\"out2\""[..]]
    );
    assert_eq!(ftx.component_group_content(1), None);
    assert!(ftx.verify().is_ok());
}

#[test]
fn test_audit_and_size_together() {
    let tx = commands_and_outputs();
    let ftx = filter(
        &tx,
        vec![
            ComponentGroupFilterParameters::audit_by_index(1, vec![0]),
            ComponentGroupFilterParameters::size_proof(2),
        ],
    );

    assert_eq!(ftx.proof_type(1), Some(MerkleProofType::Audit));
    assert_eq!(ftx.proof_type(2), Some(MerkleProofType::Size));
    assert_eq!(ftx.component_group_size(2), Some(3));
    assert!(ftx.check_all_components_visible(1).is_ok());
    assert!(ftx.check_all_components_visible(2).is_err());
    assert!(ftx.verify().is_ok());
}

#[test]
fn test_content_predicate_over_typed_components() {
    #[derive(Deserialize)]
    struct Transfer {
        to: String,
        amount: u64,
    }

    let tx = build(
        &TransactionDigestConfig::default(),
        vec![vec![
            br#"{"to":"alice","amount":5}"#.to_vec(),
            br#"{"to":"bob","amount":50}"#.to_vec(),
            br#"{"to":"carol","amount":500}"#.to_vec(),
        ]],
    );
    let ftx = filter(
        &tx,
        vec![ComponentGroupFilterParameters::audit_by_content::<Transfer, _>(
            1,
            |t| t.amount >= 50 && t.to != "carol",
        )],
    );

    assert_eq!(
        ftx.component_group_content(1).unwrap(),
        vec![&br#"{"to":"bob","amount":50}"#[..]]
    );
    assert!(ftx.verify().is_ok());
}

#[test]
fn test_undisclosed_groups_keep_top_level_slot() {
    let tx = build(
        &TransactionDigestConfig::default(),
        vec![vec![b"1".to_vec()], vec![b"2".to_vec()], vec![b"3".to_vec()], vec![b"4".to_vec()]],
    );
    let ftx = filter(&tx, vec![ComponentGroupFilterParameters::audit_by_index(3, vec![0])]);

    assert_eq!(ftx.component_group_merkle_proof().tree_size, 5);
    assert!(ftx.verify().is_ok());
}

#[test]
fn test_empty_group_placeholder() {
    let tx = build(&TransactionDigestConfig::default(), vec![vec![], vec![b"x".to_vec()]]);
    let ftx = filter(
        &tx,
        vec![
            ComponentGroupFilterParameters::size_proof(1),
            ComponentGroupFilterParameters::size_proof(2),
        ],
    );

    assert_eq!(ftx.proof_type(1), Some(MerkleProofType::Audit));
    assert_eq!(ftx.component_group_size(1), Some(1));
    assert_eq!(ftx.proof_type(2), Some(MerkleProofType::Size));
    assert!(ftx.verify().is_ok());
}

#[test]
fn test_filtered_transaction_survives_serde() {
    let tx = commands_and_outputs();
    let ftx = filter(
        &tx,
        vec![
            ComponentGroupFilterParameters::audit_by_index(1, vec![0]),
            ComponentGroupFilterParameters::size_proof(2),
        ],
    );

    let id = serde_json::to_string(ftx.id()).unwrap();
    let top = serde_json::to_string(ftx.component_group_merkle_proof()).unwrap();
    let groups = serde_json::to_string(ftx.filtered_component_groups()).unwrap();

    let received = FilteredTransaction::new(
        serde_json::from_str(&id).unwrap(),
        serde_json::from_str(&top).unwrap(),
        serde_json::from_str(&groups).unwrap(),
        marshaller(),
    );
    assert!(received.verify().is_ok());
}

// =============================================================================
// ALGORITHMS
// =============================================================================

#[test]
fn test_every_algorithm_combination_verifies() {
    for root in DigestAlgorithm::ALL {
        for group in DigestAlgorithm::ALL {
            let tx = build(
                &TransactionDigestConfig::with_algorithms(root, group),
                vec![vec![b"\"a\"".to_vec(), b"\"b\"".to_vec(), b"\"c\"".to_vec()]],
            );
            assert_eq!(tx.id().algorithm(), root);

            let audited = filter(&tx, vec![ComponentGroupFilterParameters::audit_by_index(1, vec![1])]);
            assert!(audited.verify().is_ok(), "audit {} / {}", root, group);

            let sized = filter(&tx, vec![ComponentGroupFilterParameters::size_proof(1)]);
            assert!(sized.verify().is_ok(), "size {} / {}", root, group);
        }
    }
}

#[test]
fn test_custom_root_prefixes_verify() {
    let config = TransactionDigestConfig {
        root_leaf_prefix: b"qc-leaf".to_vec(),
        root_node_prefix: b"qc-node".to_vec(),
        ..TransactionDigestConfig::default()
    };
    let tx = build(&config, vec![vec![b"1".to_vec(), b"2".to_vec()]]);
    let ftx = filter(&tx, vec![ComponentGroupFilterParameters::audit_by_index(1, vec![1])]);
    assert!(ftx.verify().is_ok());
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    /// Property: any non-empty audit subset of any group verifies and reveals
    /// exactly the chosen components.
    #[test]
    fn prop_random_audit_subset_verifies(
        size in 1usize..=12,
        mask in any::<u16>(),
        salt in any::<[u8; 32]>().prop_filter("non-zero salt", |s| s.iter().any(|b| *b != 0)),
    ) {
        let components: Vec<Vec<u8>> = (0..size).map(|i| format!("\"c{}\"", i).into_bytes()).collect();
        let tx = WireTransaction::with_config(
            &TransactionDigestConfig::default(),
            PrivacySalt::new(salt).unwrap(),
            vec![components.clone()],
            &SerdeJsonMarshallingService::new(),
        )
        .unwrap();

        let chosen: Vec<usize> = (0..size).filter(|i| mask & (1 << i) != 0).collect();
        prop_assume!(!chosen.is_empty());

        let ftx = filter(&tx, vec![ComponentGroupFilterParameters::audit_by_index(1, chosen.clone())]);
        prop_assert!(ftx.verify().is_ok());

        let expected: Vec<&[u8]> = chosen.iter().map(|&i| components[i].as_slice()).collect();
        prop_assert_eq!(ftx.component_group_content(1).unwrap(), expected);
    }

    /// Property: size proofs verify for any group size and never carry content.
    #[test]
    fn prop_size_proof_verifies_and_hides(size in 1usize..=20) {
        let components: Vec<Vec<u8>> = (0..size).map(|i| vec![b'7'; i + 1]).collect();
        let tx = build(&TransactionDigestConfig::default(), vec![components]);
        let ftx = filter(&tx, vec![ComponentGroupFilterParameters::size_proof(1)]);

        prop_assert!(ftx.verify().is_ok());
        prop_assert_eq!(ftx.component_group_size(1), Some(size));
        prop_assert!(ftx.component_group_content(1).unwrap().iter().all(|c| c.is_empty()));
    }
}
