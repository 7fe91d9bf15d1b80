//! Market quote lookup
//!
//! A quote source answers "what does this symbol trade at right now" with a
//! price or nothing. Transport failures, timeouts, unknown symbols and
//! malformed payloads all collapse to "unavailable": callers either fail the
//! order or degrade the affected row, never crash.

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Default quote API host.
pub const DEFAULT_QUOTE_HOST: &str = "https://query1.finance.yahoo.com";

const QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of current market prices.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Current price for the symbol, or `None` when unavailable.
    async fn quote(&self, symbol: &str) -> Option<Decimal>;
}

/// Quote source backed by the Yahoo Finance chart API.
pub struct YahooQuoteSource {
    client: reqwest::Client,
    host: String,
}

impl YahooQuoteSource {
    /// Create a source against the given API host (see [`DEFAULT_QUOTE_HOST`]).
    pub fn new(host: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(QUOTE_TIMEOUT).build()?;
        Ok(Self {
            client,
            host: host.into(),
        })
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    async fn quote(&self, symbol: &str) -> Option<Decimal> {
        let url = format!("{}/v8/finance/chart/{}", self.host, symbol);
        let response = match self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("quote request for {} failed: {}", symbol, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("quote lookup for {} returned {}", symbol, response.status());
            return None;
        }

        let body: ChartResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("quote payload for {} was malformed: {}", symbol, e);
                return None;
            }
        };

        body.chart
            .result?
            .first()?
            .meta
            .regular_market_price
            .and_then(Decimal::from_f64)
    }
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

/// Fixed symbol-to-price table, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticQuoteSource {
    prices: HashMap<String, Decimal>,
}

impl StaticQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_uppercase(), price);
        self
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    async fn quote(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(&symbol.to_uppercase()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn static_source_is_case_insensitive() {
        let quotes = StaticQuoteSource::new().with_price("AAPL", dec!(150.25));
        assert_eq!(quotes.quote("aapl").await, Some(dec!(150.25)));
        assert_eq!(quotes.quote("MSFT").await, None);
    }
}
