//! Rate refresh pass.

use std::sync::Arc;
use std::time::{Duration, Instant};

use coinrate_common::{Currency, DirectedPair};
use coinrate_registry::CurrencyRegistry;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::cache::{RateEntry, SharedRateCache};
use crate::error::{FxError, FxResult};
use crate::source::RateSource;

/// Configuration for the rate refresher.
#[derive(Debug, Clone)]
pub struct RefresherConfig {
    /// Upper bound on probes in flight at once. `None` means unbounded.
    pub max_concurrent_probes: Option<usize>,
    /// Upper bound on a single rate source call.
    pub probe_timeout: Duration,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_probes: None,
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl RefresherConfig {
    /// Validate configuration.
    pub fn validate(&self) -> FxResult<()> {
        match self.max_concurrent_probes {
            Some(0) => Err(FxError::InvalidConfig(
                "concurrency limit cannot be 0".to_string(),
            )),
            Some(limit) if limit > Semaphore::MAX_PERMITS => Err(FxError::InvalidConfig(format!(
                "concurrency limit cannot exceed {}",
                Semaphore::MAX_PERMITS
            ))),
            _ => Ok(()),
        }
    }

    /// Permit count for the limiter, kept within what a semaphore accepts.
    fn permit_limit(&self) -> Option<usize> {
        self.max_concurrent_probes
            .map(|limit| limit.clamp(1, Semaphore::MAX_PERMITS))
    }
}

/// One directed pair to resolve during a pass.
#[derive(Debug, Clone)]
struct Probe {
    from: Currency,
    to: Currency,
}

impl Probe {
    fn pair(&self) -> DirectedPair {
        DirectedPair::new(self.from.code.clone(), self.to.code.clone())
    }

    /// Resolve the pair and write the outcome, successful or not, to the cache.
    async fn run(self, source: &dyn RateSource, cache: &SharedRateCache, timeout: Duration) {
        let pair = self.pair();
        let entry = self.resolve(source, &pair, timeout).await;
        cache.set(pair, entry);
    }

    async fn resolve(
        &self,
        source: &dyn RateSource,
        pair: &DirectedPair,
        timeout: Duration,
    ) -> RateEntry {
        if !(self.from.available && self.to.available) {
            debug!(from = %pair.from, to = %pair.to, "Skipping unavailable pair");
            return RateEntry::unavailable();
        }

        let call = source.convert(&self.from.code, &self.to.code, Decimal::ONE);
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(FxError::Timeout { pair: pair.clone() }),
        };

        match result {
            Ok(rate) => RateEntry::available(rate),
            Err(e) => {
                warn!(
                    source = source.name(),
                    from = %pair.from,
                    to = %pair.to,
                    error = %e,
                    "Failed to fetch rate, marking pair unavailable"
                );
                RateEntry::unavailable()
            }
        }
    }
}

/// Every fiat/crypto combination in both directions. Same-kind pairs are never planned.
fn plan_probes(fiat: &[Currency], crypto: &[Currency]) -> Vec<Probe> {
    let mut probes = Vec::with_capacity(2 * fiat.len() * crypto.len());
    for f in fiat {
        for c in crypto {
            probes.push(Probe {
                from: f.clone(),
                to: c.clone(),
            });
            probes.push(Probe {
                from: c.clone(),
                to: f.clone(),
            });
        }
    }
    probes
}

/// Recomputes every directed fiat/crypto rate from the registry and rate source.
///
/// Holds no state between passes.
pub struct RateRefresher {
    registry: Arc<dyn CurrencyRegistry>,
    source: Arc<dyn RateSource>,
    cache: SharedRateCache,
    config: RefresherConfig,
}

impl RateRefresher {
    /// Create a new refresher.
    ///
    /// An out-of-range probe limit is clamped to `1..=Semaphore::MAX_PERMITS`;
    /// use [`RefresherConfig::validate`] to reject it instead.
    pub fn new(
        registry: Arc<dyn CurrencyRegistry>,
        source: Arc<dyn RateSource>,
        cache: SharedRateCache,
        config: RefresherConfig,
    ) -> Self {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Clamping concurrency limit");
        }

        Self {
            registry,
            source,
            cache,
            config,
        }
    }

    /// Get the cache this refresher writes to.
    pub fn cache(&self) -> &SharedRateCache {
        &self.cache
    }

    /// Run one full refresh pass.
    ///
    /// Fails only when the registry cannot be read, in which case nothing is
    /// written. Individual probe failures mark their pair unavailable and are
    /// logged; they never fail the pass. Returns once every probe has finished.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn run_pass(&self) -> FxResult<()> {
        let started = Instant::now();

        let currencies = self.registry.list_currencies().await?;
        let (fiat, crypto): (Vec<Currency>, Vec<Currency>) =
            currencies.into_iter().partition(|c| c.is_fiat());

        let probes = plan_probes(&fiat, &crypto);
        let probe_count = probes.len();

        let limiter = self
            .config
            .permit_limit()
            .map(|permits| Arc::new(Semaphore::new(permits)));

        let mut tasks = JoinSet::new();
        for probe in probes {
            let source = self.source.clone();
            let cache = self.cache.clone();
            let limiter = limiter.clone();
            let timeout = self.config.probe_timeout;

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                probe.run(source.as_ref(), &cache, timeout).await;
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Rate probe task aborted");
            }
        }

        info!(
            fiat = fiat.len(),
            crypto = crypto.len(),
            probes = probe_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rate refresh pass completed"
        );

        Ok(())
    }
}
