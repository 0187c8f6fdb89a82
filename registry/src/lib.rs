//! coinrate Currency Registry
//!
//! Durable store of currency records. The rate refresher reads it in bulk at
//! the start of every pass; the HTTP API mutates it.
//!
//! Two backends are provided:
//!
//! - [`MemoryRegistry`] keeps records in process memory.
//! - [`PgRegistry`] stores records in a Postgres `currencies` table.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use coinrate_common::{Currency, CurrencyId, NewCurrency, Result};

pub use memory::MemoryRegistry;
pub use postgres::PgRegistry;

/// Store of currency records keyed by identifier.
#[async_trait]
pub trait CurrencyRegistry: Send + Sync {
    /// List every registered currency.
    async fn list_currencies(&self) -> Result<Vec<Currency>>;

    /// Get a single currency.
    async fn get_currency(&self, id: CurrencyId) -> Result<Currency>;

    /// Store a new currency under a fresh identifier.
    async fn create_currency(&self, currency: NewCurrency) -> Result<Currency>;

    /// Replace every attribute of an existing currency.
    async fn update_currency(&self, currency: Currency) -> Result<()>;

    /// Remove a currency.
    async fn delete_currency(&self, id: CurrencyId) -> Result<()>;
}
