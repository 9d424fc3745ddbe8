//! # Transaction Layer
//!
//! Full transactions, the factory that filters them, and the filtered result
//! with its verifier.

pub mod factory;
pub mod filtered;
pub mod wire;

pub use factory::FilteredTransactionFactory;
pub use filtered::{FilteredComponentGroup, FilteredTransaction};
pub use wire::WireTransaction;
