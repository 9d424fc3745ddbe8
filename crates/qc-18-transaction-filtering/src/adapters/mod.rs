//! # Adapters Layer
//!
//! Secondary adapters for the qc-18 Transaction Filtering subsystem.

pub mod json;

pub use json::SerdeJsonMarshallingService;
