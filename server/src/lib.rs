//! coinrate Server
//!
//! Wires the currency registry, the FastForex rate source and the rate cache
//! into a [`RateService`], and exposes it over HTTP.

pub mod api;
pub mod config;
pub mod service;
pub mod state;
pub mod worker;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinrate_fx::FastForexClient;
use coinrate_registry::{CurrencyRegistry, MemoryRegistry, PgRegistry};

pub use config::{ConfigError, ServiceConfig};
pub use service::RateService;
pub use state::ServiceState;

/// Install the JSON log subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Open the configured registry.
pub async fn build_registry(config: &ServiceConfig) -> anyhow::Result<Arc<dyn CurrencyRegistry>> {
    match &config.database.url {
        Some(url) => {
            let registry = PgRegistry::connect(url, config.database.timeout)
                .await
                .context("connect to postgres")?;
            registry
                .ensure_schema()
                .await
                .context("prepare currencies table")?;
            info!("Using Postgres currency registry");
            Ok(Arc::new(registry))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory currency registry");
            Ok(Arc::new(MemoryRegistry::new()))
        }
    }
}

/// Build a service from configuration. The service is not started.
pub async fn build_service(config: &ServiceConfig) -> anyhow::Result<Arc<RateService>> {
    let registry = build_registry(config).await?;
    let source = Arc::new(FastForexClient::new(
        config.fast_forex.host.clone(),
        config.fast_forex.api_key.clone(),
        config.fast_forex.http_timeout,
    )
    .context("build FastForex client")?);

    Ok(Arc::new(RateService::new(
        registry,
        source,
        config.refresh.refresher_config(),
        config.refresh.interval,
    )))
}
