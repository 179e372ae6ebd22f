//! CoinGecko Market Data Feed
//!
//! Pulls the top coins by market cap from the public `/coins/markets`
//! endpoint. Every failure mode (transport error, timeout, non-2xx status,
//! undecodable body) surfaces as `FeedError::Unavailable`.

use crate::domain::errors::FeedError;
use crate::domain::market::quote::FeedQuote;
use crate::domain::ports::MarketFeed;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoMarketFeed {
    client: ClientWithMiddleware,
    base_url: String,
}

impl CoinGeckoMarketFeed {
    pub fn builder() -> CoinGeckoMarketFeedBuilder {
        CoinGeckoMarketFeedBuilder::default()
    }
}

#[derive(Default)]
pub struct CoinGeckoMarketFeedBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl CoinGeckoMarketFeedBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn build(self) -> CoinGeckoMarketFeed {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(15));
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        CoinGeckoMarketFeed {
            client: HttpClientFactory::create_client(timeout, self.max_retries.unwrap_or(0)),
            base_url,
        }
    }
}

impl CoinGeckoMarketFeed {
    async fn request_markets(&self, currency: &str, count: u32) -> anyhow::Result<Vec<FeedQuote>> {
        let url = build_url_with_query(
            &format!("{}/coins/markets", self.base_url),
            &[
                ("vs_currency", currency.to_string()),
                ("order", "market_cap_desc".to_string()),
                ("per_page", count.to_string()),
                ("page", "1".to_string()),
                ("sparkline", "false".to_string()),
            ],
        );
        debug!("CoinGecko request: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch markets from CoinGecko")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("CoinGecko markets returned {}: {}", status, error_text);
        }

        response
            .json::<Vec<FeedQuote>>()
            .await
            .context("Failed to parse CoinGecko markets response")
    }
}

#[async_trait]
impl MarketFeed for CoinGeckoMarketFeed {
    async fn fetch_markets(&self, currency: &str, count: u32) -> Result<Vec<FeedQuote>, FeedError> {
        let quotes = self
            .request_markets(currency, count)
            .await
            .map_err(FeedError::unavailable)?;

        info!(
            "CoinGecko: fetched {} markets ({} requested, vs {})",
            quotes.len(),
            count,
            currency
        );
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feed_for(server: &MockServer) -> CoinGeckoMarketFeed {
        CoinGeckoMarketFeed::builder()
            .base_url(server.uri())
            .timeout(Duration::from_secs(2))
            .build()
    }

    #[tokio::test]
    async fn test_fetch_markets_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/markets"))
            .and(query_param("vs_currency", "eur"))
            .and(query_param("order", "market_cap_desc"))
            .and(query_param("per_page", "2"))
            .and(query_param("page", "1"))
            .and(query_param("sparkline", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 50000.5},
                {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "current_price": null}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let quotes = feed_for(&server).fetch_markets("eur", 2).await.unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].symbol.as_deref(), Some("btc"));
        assert_eq!(quotes[0].current_price, Some(dec!(50000.5)));
        assert_eq!(quotes[1].current_price, None);
        assert!(quotes[0].extra.contains_key("id"));
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/markets"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        let err = feed_for(&server).fetch_markets("usd", 10).await.unwrap_err();
        assert!(matches!(err, FeedError::Unavailable { .. }));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/markets"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = feed_for(&server).fetch_markets("usd", 10).await.unwrap_err();
        assert!(matches!(err, FeedError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/markets"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let feed = CoinGeckoMarketFeed::builder()
            .base_url(server.uri())
            .timeout(Duration::from_millis(200))
            .build();

        let err = feed.fetch_markets("usd", 10).await.unwrap_err();
        assert!(matches!(err, FeedError::Unavailable { .. }));
    }
}
