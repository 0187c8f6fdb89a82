//! FastForex rate source.
//!
//! Calls `GET {host}/convert?api_key=..&from=..&to=..&amount=..` and reads the
//! converted amount from `result[to]`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use coinrate_common::{CurrencyCode, DirectedPair};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::{FxError, FxResult};
use crate::source::RateSource;

const CONVERT_PATH: &str = "convert";
const SOURCE_NAME: &str = "FASTFOREX";

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    result: HashMap<String, Decimal>,
}

/// HTTP client for the FastForex conversion API.
pub struct FastForexClient {
    client: Client,
    host: String,
    api_key: String,
}

impl FastForexClient {
    /// Create a client whose requests are bounded by `timeout`.
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> FxResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FxError::Client(e.to_string()))?;

        Ok(Self {
            client,
            host: host.into(),
            api_key: api_key.into(),
        })
    }

    fn convert_url(&self) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), CONVERT_PATH)
    }
}

/// Pull the converted amount for `pair.to` out of a response body.
fn extract_amount(pair: &DirectedPair, body: &str) -> FxResult<Decimal> {
    let parsed: ConvertResponse =
        serde_json::from_str(body).map_err(|e| FxError::InvalidResponse {
            pair: pair.clone(),
            message: e.to_string(),
        })?;

    parsed
        .result
        .get(pair.to.as_str())
        .copied()
        .ok_or_else(|| FxError::InvalidResponse {
            pair: pair.clone(),
            message: format!("missing result for {}", pair.to),
        })
}

#[async_trait]
impl RateSource for FastForexClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn convert(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: Decimal,
    ) -> FxResult<Decimal> {
        let pair = DirectedPair::new(from.clone(), to.clone());
        let amount = amount.normalize().to_string();

        let transport_error = |e: reqwest::Error| {
            if e.is_timeout() {
                FxError::Timeout { pair: pair.clone() }
            } else {
                FxError::Source {
                    pair: pair.clone(),
                    message: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(self.convert_url())
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("amount", amount.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FxError::Source {
                pair: pair.clone(),
                message: format!("unexpected status {status}"),
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        let converted = extract_amount(&pair, &body)?;

        debug!(pair = %pair, amount = %amount, converted = %converted, "FastForex conversion");
        Ok(converted)
    }
}
