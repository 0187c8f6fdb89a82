//! In-memory currency registry.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use coinrate_common::{
    Currency, CurrencyCode, CurrencyId, NewCurrency, RegistryError, Result,
};

use crate::CurrencyRegistry;

/// Registry that keeps currencies in process memory.
pub struct MemoryRegistry {
    currencies: DashMap<CurrencyId, Currency>,
    /// Code uniqueness index. Mutations hold its write lock for their whole duration.
    codes: RwLock<HashMap<CurrencyCode, CurrencyId>>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            currencies: DashMap::new(),
            codes: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry pre-populated with the given currencies.
    pub fn with_currencies(currencies: impl IntoIterator<Item = Currency>) -> Self {
        let registry = Self::new();
        {
            let mut codes = registry.codes.write();
            for currency in currencies {
                codes.insert(currency.code.clone(), currency.id);
                registry.currencies.insert(currency.id, currency);
            }
        }
        registry
    }

    /// Get the number of registered currencies.
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CurrencyRegistry for MemoryRegistry {
    async fn list_currencies(&self) -> Result<Vec<Currency>> {
        Ok(self.currencies.iter().map(|e| e.value().clone()).collect())
    }

    async fn get_currency(&self, id: CurrencyId) -> Result<Currency> {
        self.currencies
            .get(&id)
            .map(|c| c.clone())
            .ok_or(RegistryError::NotFound(id))
    }

    async fn create_currency(&self, currency: NewCurrency) -> Result<Currency> {
        let mut codes = self.codes.write();

        if codes.contains_key(&currency.code) {
            return Err(RegistryError::AlreadyExists(currency.code.to_string()));
        }

        let currency = currency.into_currency(CurrencyId::new());
        codes.insert(currency.code.clone(), currency.id);
        self.currencies.insert(currency.id, currency.clone());

        debug!(id = %currency.id, code = %currency.code, "Currency created");
        Ok(currency)
    }

    async fn update_currency(&self, currency: Currency) -> Result<()> {
        let mut codes = self.codes.write();

        let previous_code = self
            .currencies
            .get(&currency.id)
            .map(|c| c.code.clone())
            .ok_or(RegistryError::NotFound(currency.id))?;

        if previous_code != currency.code {
            if codes.contains_key(&currency.code) {
                return Err(RegistryError::AlreadyExists(currency.code.to_string()));
            }
            codes.remove(&previous_code);
            codes.insert(currency.code.clone(), currency.id);
        }

        debug!(id = %currency.id, code = %currency.code, "Currency updated");
        self.currencies.insert(currency.id, currency);
        Ok(())
    }

    async fn delete_currency(&self, id: CurrencyId) -> Result<()> {
        let mut codes = self.codes.write();

        let (_, removed) = self
            .currencies
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        codes.remove(&removed.code);

        debug!(id = %id, code = %removed.code, "Currency deleted");
        Ok(())
    }
}
