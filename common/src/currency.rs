//! Currency records, codes and directed pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RegistryError;
use crate::identifiers::CurrencyId;

/// Currency code such as `USD` or `BTC`.
///
/// Codes are normalized to trimmed upper case so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new currency code.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Kind of currency. Only fiat/crypto pairs are ever priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CurrencyKind {
    Crypto,
    Fiat,
}

impl CurrencyKind {
    /// Numeric code used on the wire and in storage.
    pub fn code(&self) -> i32 {
        match self {
            CurrencyKind::Crypto => 1,
            CurrencyKind::Fiat => 2,
        }
    }

    pub fn is_fiat(&self) -> bool {
        matches!(self, CurrencyKind::Fiat)
    }

    pub fn is_crypto(&self) -> bool {
        matches!(self, CurrencyKind::Crypto)
    }
}

impl TryFrom<i32> for CurrencyKind {
    type Error = RegistryError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CurrencyKind::Crypto),
            2 => Ok(CurrencyKind::Fiat),
            other => Err(RegistryError::InvalidKind(other)),
        }
    }
}

impl From<CurrencyKind> for i32 {
    fn from(kind: CurrencyKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyKind::Crypto => write!(f, "crypto"),
            CurrencyKind::Fiat => write!(f, "fiat"),
        }
    }
}

/// A registered currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    pub name: String,
    pub code: CurrencyCode,
    pub kind: CurrencyKind,
    /// Whether the currency may take part in conversions.
    pub available: bool,
}

impl Currency {
    /// Create a currency with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<CurrencyCode>,
        kind: CurrencyKind,
        available: bool,
    ) -> Self {
        Self {
            id: CurrencyId::new(),
            name: name.into(),
            code: code.into(),
            kind,
            available,
        }
    }

    /// Create an available fiat currency.
    pub fn fiat(name: impl Into<String>, code: impl Into<CurrencyCode>) -> Self {
        Self::new(name, code, CurrencyKind::Fiat, true)
    }

    /// Create an available crypto currency.
    pub fn crypto(name: impl Into<String>, code: impl Into<CurrencyCode>) -> Self {
        Self::new(name, code, CurrencyKind::Crypto, true)
    }

    /// Mark the currency unavailable.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn is_fiat(&self) -> bool {
        self.kind.is_fiat()
    }

    pub fn is_crypto(&self) -> bool {
        self.kind.is_crypto()
    }
}

/// Attributes of a currency that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCurrency {
    pub name: String,
    pub code: CurrencyCode,
    pub kind: CurrencyKind,
    pub available: bool,
}

impl NewCurrency {
    /// Assign an identifier, producing a full record.
    pub fn into_currency(self, id: CurrencyId) -> Currency {
        Currency {
            id,
            name: self.name,
            code: self.code,
            kind: self.kind,
            available: self.available,
        }
    }
}

/// An ordered `(from, to)` pair of currency codes.
///
/// `USD/BTC` and `BTC/USD` are distinct: rates are not assumed symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectedPair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl DirectedPair {
    /// Create a new directed pair.
    pub fn new(from: impl Into<CurrencyCode>, to: impl Into<CurrencyCode>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for DirectedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}
