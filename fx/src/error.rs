//! FX error types.

use coinrate_common::{DirectedPair, RegistryError};
use thiserror::Error;

/// Errors that can occur in the FX core.
#[derive(Debug, Error)]
pub enum FxError {
    /// No usable cached rate for the pair: never probed, or the latest probe
    /// left it unavailable.
    #[error("Currency not available for conversion: {pair}")]
    NotAvailable { pair: DirectedPair },

    /// The currency registry could not be read.
    #[error("Currency registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The rate source request failed.
    #[error("Rate source error for {pair}: {message}")]
    Source { pair: DirectedPair, message: String },

    /// The rate source did not answer in time.
    #[error("Rate source timed out for {pair}")]
    Timeout { pair: DirectedPair },

    /// The rate source answered with something unusable.
    #[error("Invalid rate source response for {pair}: {message}")]
    InvalidResponse { pair: DirectedPair, message: String },

    /// The converted amount does not fit in a decimal.
    #[error("Conversion overflow for {pair}")]
    Overflow { pair: DirectedPair },

    /// The rate source client could not be constructed.
    #[error("Rate source client error: {0}")]
    Client(String),

    /// Refresher settings out of range.
    #[error("Invalid refresher configuration: {0}")]
    InvalidConfig(String),
}

impl FxError {
    pub fn is_not_available(&self) -> bool {
        matches!(self, FxError::NotAvailable { .. })
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
