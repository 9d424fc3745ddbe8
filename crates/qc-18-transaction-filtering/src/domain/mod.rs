//! # Domain Layer
//!
//! Pure domain logic for the Transaction Filtering subsystem: errors, value
//! objects, filter parameters and the metadata document.
//!
//! ## Hexagonal Architecture
//!
//! This module contains NO I/O dependencies. JSON handling goes through the
//! `JsonMarshallingService` port.

pub mod errors;
pub mod filter;
pub mod metadata;
pub mod value_objects;

pub use errors::*;
pub use filter::*;
pub use metadata::*;
pub use value_objects::*;
