//! Rate service lifecycle.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use coinrate_fx::{
    ConversionEvaluator, FxResult, RateRefresher, RateSource, RefresherConfig, SharedRateCache,
};
use coinrate_registry::CurrencyRegistry;

use crate::state::ServiceState;
use crate::worker::run_refresh_loop;

/// Owns the rate cache and everything that reads or writes it.
pub struct RateService {
    registry: Arc<dyn CurrencyRegistry>,
    cache: SharedRateCache,
    refresher: Arc<RateRefresher>,
    evaluator: ConversionEvaluator,
    refresh_interval: Duration,
    state: RwLock<ServiceState>,
    shutdown_tx: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RateService {
    /// Create a new service with an empty cache.
    pub fn new(
        registry: Arc<dyn CurrencyRegistry>,
        source: Arc<dyn RateSource>,
        refresher_config: RefresherConfig,
        refresh_interval: Duration,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        let cache = SharedRateCache::default();
        let refresher = Arc::new(RateRefresher::new(
            registry.clone(),
            source,
            cache.clone(),
            refresher_config,
        ));

        Self {
            registry,
            evaluator: ConversionEvaluator::new(cache.clone()),
            cache,
            refresher,
            refresh_interval,
            state: RwLock::new(ServiceState::Starting),
            shutdown_tx,
            worker: Mutex::new(None),
        }
    }

    /// Run the first refresh pass, then schedule the rest in the background.
    ///
    /// A failed first pass is returned and nothing is scheduled.
    #[instrument(skip(self))]
    pub async fn start(&self) -> FxResult<()> {
        info!("Starting rate service");

        if let Err(e) = self.refresher.run_pass().await {
            error!(error = %e, "Initial rate refresh failed");
            *self.state.write() = ServiceState::Stopped;
            return Err(e);
        }

        let handle = tokio::spawn(run_refresh_loop(
            self.refresher.clone(),
            self.refresh_interval,
            self.shutdown_tx.subscribe(),
        ));
        *self.worker.lock() = Some(handle);
        *self.state.write() = ServiceState::Running;

        let stats = self.cache.stats();
        info!(
            pairs = stats.total_entries,
            available = stats.available_entries,
            "Rate service started"
        );
        Ok(())
    }

    /// Stop scheduling passes and wait for the worker to exit.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        info!("Stopping rate service");

        *self.state.write() = ServiceState::ShuttingDown;
        self.shutdown_tx.send_replace(true);

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(error = %e, "Refresh worker aborted");
            }
        }

        *self.state.write() = ServiceState::Stopped;
        info!("Rate service stopped");
    }

    /// Get the current service state.
    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }

    pub fn registry(&self) -> &Arc<dyn CurrencyRegistry> {
        &self.registry
    }

    pub fn evaluator(&self) -> &ConversionEvaluator {
        &self.evaluator
    }

    pub fn cache(&self) -> &SharedRateCache {
        &self.cache
    }
}
