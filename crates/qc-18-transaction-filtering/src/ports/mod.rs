//! # Ports Layer
//!
//! Hexagonal architecture ports for the Transaction Filtering subsystem.
//!
//! - **Driven Ports (Outbound)**: SPIs implemented by adapters (marshalling)

pub mod outbound;

pub use outbound::*;
