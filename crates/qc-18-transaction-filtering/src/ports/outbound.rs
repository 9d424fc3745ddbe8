//! # Outbound Ports (Driven Ports)
//!
//! SPIs required by the Transaction Filtering subsystem.

use thiserror::Error;

/// Abstract interface for JSON marshalling.
///
/// The subsystem only ever decodes the metadata group (to learn digest
/// settings) and, when a content predicate is requested, the components of
/// the filtered group. Everything else stays opaque bytes.
pub trait JsonMarshallingService: Send + Sync {
    /// Parse raw bytes into a JSON value.
    fn parse(&self, bytes: &[u8]) -> Result<serde_json::Value, MarshallingError>;

    /// Render a JSON value to bytes.
    fn format(&self, value: &serde_json::Value) -> Result<Vec<u8>, MarshallingError>;
}

/// Marshalling errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Marshalling error: {message}")]
pub struct MarshallingError {
    pub message: String,
}

impl MarshallingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
