//! HTTP client for store product pages using wreq for TLS fingerprint emulation.

use crate::config::ScraperConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngExt;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Fetches rendered product pages - enables mocking for tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the product page for an ASIN and returns its HTML.
    async fn product_page(&self, asin: &str) -> Result<String>;

    /// Returns the public URL of the product page for an ASIN.
    fn product_url(&self, asin: &str) -> String;
}

/// Store HTTP client with browser impersonation and a bounded page-load timeout.
pub struct StoreClient {
    client: Client,
    store_url: String,
    user_agent: String,
    accept_language: String,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl StoreClient {
    /// Creates a new client from the scraper configuration.
    pub async fn new(config: &ScraperConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            store_url: config.store_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    async fn get(&self, url: &str) -> Result<String> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("User-Agent", &self.user_agent)
            .header("Accept", ACCEPT_HTML)
            .header("Accept-Language", &self.accept_language)
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .with_context(|| format!("Failed to load page: {}", url))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 {
            warn!("Store answered 503; the page was not served");
            anyhow::bail!("Page load failed: store returned 503 for {}", url);
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }

    /// Waits the configured delay plus random jitter.
    async fn delay(&self) {
        if self.delay_ms == 0 && self.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl PageFetcher for StoreClient {
    async fn product_page(&self, asin: &str) -> Result<String> {
        let url = self.product_url(asin);

        info!("Fetching product page: {}", asin);
        self.get(&url).await
    }

    fn product_url(&self, asin: &str) -> String {
        format!("{}/dp/{}", self.store_url, asin)
    }
}
