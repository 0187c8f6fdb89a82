//! Directed rate cache.

use coinrate_common::DirectedPair;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::trace;

/// Outcome of the latest probe for one directed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEntry {
    /// Price of one unit of `from` in `to`. Zero when unavailable.
    pub rate: Decimal,
    pub available: bool,
}

impl RateEntry {
    /// Entry for a successful probe.
    pub fn available(rate: Decimal) -> Self {
        Self {
            rate,
            available: true,
        }
    }

    /// Entry for a skipped or failed probe.
    pub fn unavailable() -> Self {
        Self {
            rate: Decimal::ZERO,
            available: false,
        }
    }
}

/// Thread-safe map from directed pair to its latest rate entry.
///
/// Entries are only ever replaced, never removed. Each key is written as a
/// whole, so readers never see a rate from one probe paired with the
/// availability of another.
pub struct RateCache {
    entries: DashMap<DirectedPair, RateEntry>,
}

impl RateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Overwrite the entry for a pair.
    pub fn set(&self, pair: DirectedPair, entry: RateEntry) {
        trace!(pair = %pair, rate = %entry.rate, available = entry.available, "Cache set");
        self.entries.insert(pair, entry);
    }

    /// Get the usable rate for a pair.
    ///
    /// Returns `None` both when the pair was never written and when its latest
    /// entry is unavailable; callers cannot tell the two apart.
    pub fn get(&self, pair: &DirectedPair) -> Option<Decimal> {
        self.entries
            .get(pair)
            .filter(|entry| entry.available)
            .map(|entry| entry.rate)
    }

    /// Get the raw stored entry, including unavailable ones.
    pub fn entry(&self, pair: &DirectedPair) -> Option<RateEntry> {
        self.entries.get(pair).map(|entry| *entry)
    }

    /// Get the number of entries in cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.entries.len();
        let available = self.entries.iter().filter(|e| e.available).count();

        CacheStats {
            total_entries: total,
            available_entries: available,
            unavailable_entries: total.saturating_sub(available),
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub available_entries: usize,
    pub unavailable_entries: usize,
}

/// Shared rate cache.
pub type SharedRateCache = Arc<RateCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn pair(from: &str, to: &str) -> DirectedPair {
        DirectedPair::new(from, to)
    }

    #[test]
    fn test_cache_set_and_get() {
        let cache = RateCache::new();
        cache.set(pair("USD", "BTC"), RateEntry::available(dec!(0.00045634)));

        assert_eq!(cache.get(&pair("USD", "BTC")), Some(dec!(0.00045634)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_miss() {
        let cache = RateCache::new();

        assert!(cache.get(&pair("USD", "BTC")).is_none());
        assert!(cache.entry(&pair("USD", "BTC")).is_none());
    }

    #[test]
    fn test_pairs_are_directed() {
        let cache = RateCache::new();
        cache.set(pair("USD", "BTC"), RateEntry::available(dec!(0.00045634)));

        assert!(cache.get(&pair("BTC", "USD")).is_none());
    }

    #[test]
    fn test_unavailable_entry_is_a_miss() {
        let cache = RateCache::new();
        cache.set(
            pair("BTC", "USD"),
            RateEntry {
                rate: dec!(70000),
                available: false,
            },
        );

        assert!(cache.get(&pair("BTC", "USD")).is_none());
        assert_eq!(cache.entry(&pair("BTC", "USD")).map(|e| e.available), Some(false));
    }

    #[test]
    fn test_failed_probe_overwrites_success() {
        let cache = RateCache::new();
        cache.set(pair("BTC", "USD"), RateEntry::available(dec!(70000)));
        cache.set(pair("BTC", "USD"), RateEntry::unavailable());

        assert!(cache.get(&pair("BTC", "USD")).is_none());
        assert_eq!(cache.entry(&pair("BTC", "USD")), Some(RateEntry::unavailable()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_stats() {
        let cache = RateCache::new();
        cache.set(pair("USD", "BTC"), RateEntry::available(dec!(0.00045634)));
        cache.set(pair("BTC", "USD"), RateEntry::available(dec!(70000)));
        cache.set(pair("USD", "ETH"), RateEntry::unavailable());

        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 3,
                available_entries: 2,
                unavailable_entries: 1,
            }
        );
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let cache = Arc::new(RateCache::new());
        let codes: Vec<String> = (0..16).map(|i| format!("C{i}")).collect();

        std::thread::scope(|scope| {
            for code in &codes {
                let cache = cache.clone();
                scope.spawn(move || {
                    for round in 0..100u32 {
                        cache.set(
                            DirectedPair::new("USD", code.as_str()),
                            RateEntry::available(Decimal::from(round)),
                        );
                    }
                });
            }
            for code in &codes {
                let cache = cache.clone();
                scope.spawn(move || {
                    for _ in 0..100 {
                        if let Some(entry) = cache.entry(&DirectedPair::new("USD", code.as_str())) {
                            assert!(entry.available);
                        }
                    }
                });
            }
        });

        assert_eq!(cache.len(), codes.len());
        for code in &codes {
            assert_eq!(
                cache.get(&DirectedPair::new("USD", code.as_str())),
                Some(Decimal::from(99))
            );
        }
    }

    proptest! {
        #[test]
        fn prop_get_hits_only_available_entries(
            mantissa in any::<i64>(),
            scale in 0u32..18,
            available in any::<bool>(),
        ) {
            let cache = RateCache::new();
            let rate = Decimal::new(mantissa, scale);
            cache.set(pair("EUR", "ETH"), RateEntry { rate, available });

            let hit = cache.get(&pair("EUR", "ETH"));
            if available {
                prop_assert_eq!(hit, Some(rate));
            } else {
                prop_assert_eq!(hit, None);
            }
        }
    }
}
