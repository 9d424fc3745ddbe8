//! `serde_json` backed marshalling adapter.

use crate::ports::{JsonMarshallingService, MarshallingError};

/// Marshalling service over `serde_json`.
///
/// Objects are rendered with sorted keys, so equal values always produce
/// equal bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonMarshallingService;

impl SerdeJsonMarshallingService {
    pub fn new() -> Self {
        Self
    }
}

impl JsonMarshallingService for SerdeJsonMarshallingService {
    fn parse(&self, bytes: &[u8]) -> Result<serde_json::Value, MarshallingError> {
        serde_json::from_slice(bytes).map_err(|e| MarshallingError::new(e.to_string()))
    }

    fn format(&self, value: &serde_json::Value) -> Result<Vec<u8>, MarshallingError> {
        serde_json::to_vec(value).map_err(|e| MarshallingError::new(e.to_string()))
    }
}
