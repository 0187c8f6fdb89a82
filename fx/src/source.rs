//! Rate source trait and test implementation.

use async_trait::async_trait;
use coinrate_common::CurrencyCode;
use rust_decimal::Decimal;

use crate::error::FxResult;

/// External capability that prices an amount of one currency in another.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Convert `amount` units of `from` into `to`.
    async fn convert(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: Decimal,
    ) -> FxResult<Decimal>;
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockRateSource;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use coinrate_common::{CurrencyCode, DirectedPair};
    use dashmap::DashMap;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    use super::RateSource;
    use crate::error::{FxError, FxResult};

    #[derive(Debug, Clone)]
    enum Scripted {
        Rate(Decimal),
        Fail(String),
    }

    /// Scripted rate source for tests.
    ///
    /// Pairs without a scripted answer fail. Every call is recorded.
    pub struct MockRateSource {
        name: String,
        answers: DashMap<DirectedPair, Scripted>,
        delay: Option<Duration>,
        calls: Mutex<Vec<DirectedPair>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockRateSource {
        /// Create a new mock source.
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                answers: DashMap::new(),
                delay: None,
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        /// Sleep this long inside every call.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Answer `from -> to` with a unit rate.
        pub fn set_rate(&self, from: &str, to: &str, rate: Decimal) {
            self.answers
                .insert(DirectedPair::new(from, to), Scripted::Rate(rate));
        }

        /// Fail every `from -> to` call.
        pub fn set_failure(&self, from: &str, to: &str, message: impl Into<String>) {
            self.answers
                .insert(DirectedPair::new(from, to), Scripted::Fail(message.into()));
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        /// Whether `from -> to` was ever requested.
        pub fn was_called(&self, from: &str, to: &str) -> bool {
            let pair = DirectedPair::new(from, to);
            self.calls.lock().iter().any(|p| *p == pair)
        }

        /// Highest number of simultaneous calls observed.
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for MockRateSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn convert(
            &self,
            from: &CurrencyCode,
            to: &CurrencyCode,
            amount: Decimal,
        ) -> FxResult<Decimal> {
            let pair = DirectedPair::new(from.clone(), to.clone());
            self.calls.lock().push(pair.clone());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let answer = self.answers.get(&pair).map(|a| a.clone());
            match answer {
                Some(Scripted::Rate(rate)) => Ok(rate * amount),
                Some(Scripted::Fail(message)) => Err(FxError::Source { pair, message }),
                None => Err(FxError::Source {
                    pair,
                    message: "no rate scripted".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_source() {
        let source = MockRateSource::new("test");
        source.set_rate("USD", "BTC", dec!(0.00045634));

        let rate = source
            .convert(&"USD".into(), &"BTC".into(), dec!(2))
            .await
            .unwrap();

        assert_eq!(rate, dec!(0.00091268));
        assert!(source.was_called("USD", "BTC"));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_source_failure() {
        let source = MockRateSource::new("test");
        source.set_failure("BTC", "USD", "upstream down");

        let result = source.convert(&"BTC".into(), &"USD".into(), Decimal::ONE).await;

        assert!(matches!(result, Err(FxError::Source { message, .. }) if message == "upstream down"));
    }

    #[tokio::test]
    async fn test_mock_source_unscripted_pair_fails() {
        let source = MockRateSource::new("test");

        let result = source.convert(&"EUR".into(), &"ETH".into(), Decimal::ONE).await;

        assert!(result.is_err());
        assert!(source.was_called("EUR", "ETH"));
    }
}
