//! Error types for the currency registry.

use crate::CurrencyId;
use thiserror::Error;

/// Errors returned by currency registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No currency with the given identifier.
    #[error("Currency not found: {0}")]
    NotFound(CurrencyId),

    /// Another currency already uses this code.
    #[error("Currency already exists: {0}")]
    AlreadyExists(String),

    /// Kind code is neither crypto (1) nor fiat (2).
    #[error("Invalid currency kind: {0}")]
    InvalidKind(i32),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Get error code for API responses and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistryError::NotFound(_) => "NOT_FOUND",
            RegistryError::AlreadyExists(_) => "ALREADY_EXISTS",
            RegistryError::InvalidKind(_) => "INVALID_KIND",
            RegistryError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
