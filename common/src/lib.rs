//! coinrate Common Types
//!
//! Shared types used across the coinrate workspace: currency records, their
//! identifiers and codes, directed currency pairs, and registry errors.

pub mod identifiers;
pub mod currency;
pub mod error;

pub use identifiers::*;
pub use currency::*;
pub use error::*;
