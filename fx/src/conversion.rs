//! Conversion against cached rates.

use coinrate_common::{CurrencyCode, DirectedPair};
use rust_decimal::Decimal;
use tracing::debug;

use crate::cache::SharedRateCache;
use crate::error::{FxError, FxResult};

/// Converts amounts using whatever the cache holds right now.
///
/// Never calls the rate source; the answer reflects the most recently
/// completed probe for the pair.
#[derive(Clone)]
pub struct ConversionEvaluator {
    cache: SharedRateCache,
}

impl ConversionEvaluator {
    pub fn new(cache: SharedRateCache) -> Self {
        Self { cache }
    }

    /// Convert `amount` of `from` into `to`.
    ///
    /// Fails with [`FxError::NotAvailable`] when the pair has no usable rate,
    /// whether it was never probed, its latest probe failed, or it is not a
    /// fiat/crypto pair at all.
    pub fn convert(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: Decimal,
    ) -> FxResult<Decimal> {
        let pair = DirectedPair::new(from.clone(), to.clone());

        let rate = self
            .cache
            .get(&pair)
            .ok_or_else(|| FxError::NotAvailable { pair: pair.clone() })?;

        let converted = amount
            .checked_mul(rate)
            .ok_or_else(|| FxError::Overflow { pair: pair.clone() })?;

        debug!(pair = %pair, amount = %amount, rate = %rate, converted = %converted, "Converted");
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{RateCache, RateEntry};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn evaluator() -> (ConversionEvaluator, SharedRateCache) {
        let cache = Arc::new(RateCache::new());
        cache.set(DirectedPair::new("USD", "BTC"), RateEntry::available(dec!(0.00045634)));
        cache.set(DirectedPair::new("BTC", "USD"), RateEntry::available(dec!(70000)));
        cache.set(DirectedPair::new("USD", "ETH"), RateEntry::unavailable());
        (ConversionEvaluator::new(cache.clone()), cache)
    }

    #[test]
    fn test_convert_fiat_to_crypto() {
        let (evaluator, _) = evaluator();

        let result = evaluator
            .convert(&"USD".into(), &"BTC".into(), dec!(70000))
            .unwrap();

        assert_eq!(result, dec!(31.9438));
    }

    #[test]
    fn test_convert_crypto_to_fiat() {
        let (evaluator, _) = evaluator();

        let result = evaluator
            .convert(&"BTC".into(), &"USD".into(), dec!(0.5))
            .unwrap();

        assert_eq!(result, dec!(35000));
    }

    #[test]
    fn test_convert_zero_amount() {
        let (evaluator, _) = evaluator();

        let result = evaluator
            .convert(&"BTC".into(), &"USD".into(), Decimal::ZERO)
            .unwrap();

        assert!(result.is_zero());
    }

    #[test]
    fn test_codes_are_case_insensitive() {
        let (evaluator, _) = evaluator();

        let result = evaluator
            .convert(&"usd".into(), &"btc".into(), dec!(1))
            .unwrap();

        assert_eq!(result, dec!(0.00045634));
    }

    #[test]
    fn test_unavailable_pair() {
        let (evaluator, _) = evaluator();

        let err = evaluator
            .convert(&"USD".into(), &"ETH".into(), dec!(10))
            .unwrap_err();

        assert!(err.is_not_available());
    }

    #[test]
    fn test_unknown_and_same_kind_pairs() {
        let (evaluator, _) = evaluator();

        assert!(evaluator
            .convert(&"EUR".into(), &"BTC".into(), dec!(1))
            .unwrap_err()
            .is_not_available());
        assert!(evaluator
            .convert(&"USD".into(), &"EUR".into(), dec!(1))
            .unwrap_err()
            .is_not_available());
        assert!(evaluator
            .convert(&"USD".into(), &"USD".into(), dec!(1))
            .unwrap_err()
            .is_not_available());
    }

    #[test]
    fn test_reflects_latest_cache_write() {
        let (evaluator, cache) = evaluator();
        cache.set(DirectedPair::new("BTC", "USD"), RateEntry::unavailable());

        assert!(evaluator
            .convert(&"BTC".into(), &"USD".into(), dec!(1))
            .unwrap_err()
            .is_not_available());

        cache.set(DirectedPair::new("BTC", "USD"), RateEntry::available(dec!(71000)));
        assert_eq!(
            evaluator.convert(&"BTC".into(), &"USD".into(), dec!(2)).unwrap(),
            dec!(142000)
        );
    }

    #[test]
    fn test_overflow() {
        let (evaluator, _) = evaluator();

        let err = evaluator
            .convert(&"BTC".into(), &"USD".into(), Decimal::MAX)
            .unwrap_err();

        assert!(matches!(err, FxError::Overflow { .. }));
    }
}
