//! coinrate FX Core
//!
//! Keeps a live table of directed fiat/crypto conversion rates and serves
//! conversions against it.
//!
//! # Components
//!
//! - [`RateCache`]: concurrent map from a directed currency pair to the result
//!   of its latest probe
//! - [`RateRefresher`]: runs a refresh pass, probing every fiat/crypto pair in
//!   both directions against a [`RateSource`]
//! - [`ConversionEvaluator`]: multiplies an amount by a cached rate
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use coinrate_fx::{ConversionEvaluator, RateCache, RateRefresher, RefresherConfig};
//!
//! let cache = Arc::new(RateCache::new());
//! let refresher = RateRefresher::new(registry, source, cache.clone(), RefresherConfig::default());
//! refresher.run_pass().await?;
//!
//! let evaluator = ConversionEvaluator::new(cache);
//! let btc = evaluator.convert(&"USD".into(), &"BTC".into(), dec!(70000))?;
//! ```

pub mod cache;
pub mod source;
pub mod fastforex;
pub mod refresher;
pub mod conversion;
pub mod error;

pub use cache::{RateCache, RateEntry, SharedRateCache};
pub use source::RateSource;
#[cfg(any(test, feature = "test-utils"))]
pub use source::MockRateSource;
pub use fastforex::FastForexClient;
pub use refresher::{RateRefresher, RefresherConfig};
pub use conversion::ConversionEvaluator;
pub use error::{FxError, FxResult};
