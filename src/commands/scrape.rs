//! Scrape command: fetch product pages, extract prices, optionally record offers.

use crate::amazon::{PageFetcher, Parser, StoreClient};
use crate::catalog::{OfferSubmission, OfferTerms, Store};
use crate::config::Config;
use crate::format::{Formatter, ScrapeReport};
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

/// Where a scraped price should be written as an offer.
#[derive(Debug, Clone)]
pub struct RecordTarget {
    pub product_slug: String,
    pub seller_name: String,
    pub warranty_type: String,
    pub return_days: i64,
}

/// Resolved (product_id, seller_id) pair plus the offer terms to write.
struct Recorder<'a> {
    store: &'a Store,
    product_id: i64,
    seller_id: i64,
    target: &'a RecordTarget,
}

/// Executes price scrapes by ASIN.
pub struct ScrapeCommand {
    config: Config,
    category: Option<String>,
    record: Option<RecordTarget>,
}

impl ScrapeCommand {
    pub fn new(config: Config) -> Self {
        Self { config, category: None, record: None }
    }

    /// Picks the category whose price band applies.
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Records found prices as offers for the given product and seller.
    pub fn record(mut self, target: Option<RecordTarget>) -> Self {
        self.record = target;
        self
    }

    /// Scrapes the ASINs and returns formatted output.
    pub async fn execute(&self, asins: &[String]) -> Result<String> {
        let client =
            StoreClient::new(&self.config.scraper).await.context("Failed to create HTTP client")?;

        let store = match &self.record {
            Some(_) => Some(
                Store::connect(&self.config.database_url)
                    .await
                    .context("Failed to open database")?,
            ),
            None => None,
        };

        self.execute_with(&client, store.as_ref(), asins).await
    }

    /// Scrapes with a provided fetcher and store (for testing).
    ///
    /// A single ASIN that cannot be fetched is an error; in a batch the
    /// failing ASIN is logged and skipped.
    pub async fn execute_with(
        &self,
        client: &impl PageFetcher,
        store: Option<&Store>,
        asins: &[String],
    ) -> Result<String> {
        let recorder = match (&self.record, store) {
            (Some(target), Some(store)) => Some(resolve(store, target).await?),
            (Some(_), None) => anyhow::bail!("Recording offers requires a database"),
            _ => None,
        };

        let formatter = Formatter::new(self.config.format);

        if let [asin] = asins {
            let asin = normalize_asin(asin)?;
            let report = self.scrape_one(client, recorder.as_ref(), &asin).await?;
            return Ok(formatter.format_report(&report));
        }

        let mut reports = Vec::new();
        for asin in asins {
            let asin = match normalize_asin(asin) {
                Ok(a) => a,
                Err(e) => {
                    warn!("Skipping: {}", e);
                    continue;
                }
            };

            match self.scrape_one(client, recorder.as_ref(), &asin).await {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Failed to scrape {}: {:#}", asin, e),
            }
        }

        Ok(formatter.format_reports(&reports))
    }

    async fn scrape_one(
        &self,
        client: &impl PageFetcher,
        recorder: Option<&Recorder<'_>>,
        asin: &str,
    ) -> Result<ScrapeReport> {
        info!("Scraping price for {}", asin);

        let url = client.product_url(asin);
        let html = client.product_page(asin).await?;

        let page = Parser::new().scan(&html);
        let extractor = self.config.extractor.extractor_for(self.category.as_deref());
        let extracted = extractor.extract_detailed(&page.candidates);

        let mut recorded = false;
        if let (Some(found), Some(recorder)) = (extracted, recorder) {
            recorder.write(found.price, &url).await?;
            recorded = true;
        } else if extracted.is_none() {
            info!("No confident price for {}", asin);
        }

        Ok(ScrapeReport {
            source: asin.to_string(),
            url: Some(url),
            title: page.title,
            price: extracted.map(|e| e.price),
            phase: extracted.map(|e| e.phase),
            band: extractor.band(),
            robot_check: page.robot_check,
            recorded,
        })
    }
}

/// Looks up the product and seller an offer will be recorded against.
async fn resolve<'a>(store: &'a Store, target: &'a RecordTarget) -> Result<Recorder<'a>> {
    let product = store
        .product_by_slug(&target.product_slug)
        .await?
        .with_context(|| format!("Unknown product slug: {}", target.product_slug))?;

    let seller = store
        .seller_by_name(&target.seller_name)
        .await?
        .with_context(|| format!("Unknown seller: {}", target.seller_name))?;

    Ok(Recorder { store, product_id: product.id, seller_id: seller.id, target })
}

impl Recorder<'_> {
    async fn write(&self, price: i64, url: &str) -> Result<()> {
        let submission = OfferSubmission {
            product_id: self.product_id,
            seller_id: self.seller_id,
            terms: OfferTerms {
                price_inr: price,
                warranty_type: self.target.warranty_type.clone(),
                return_days: self.target.return_days,
                product_url: url.to_string(),
            },
        };

        self.store.upsert_offer(&submission, Utc::now()).await?;
        info!(
            "Recorded {} for {} / {}",
            price, self.target.product_slug, self.target.seller_name
        );
        Ok(())
    }
}

/// Trims and uppercases an ASIN, checking it is 10 alphanumeric characters.
pub fn normalize_asin(asin: &str) -> Result<String> {
    let asin = asin.trim().to_uppercase();
    if asin.len() != 10 || !asin.chars().all(|c| c.is_ascii_alphanumeric()) {
        anyhow::bail!(
            "Invalid ASIN format: '{}'. ASIN should be 10 alphanumeric characters.",
            asin
        );
    }
    Ok(asin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NewProduct, NewSeller};
    use crate::config::OutputFormat;
    use crate::extract::PriceBand;
    use async_trait::async_trait;

    /// Mock fetcher for testing.
    struct MockFetcher {
        html: String,
        should_fail: bool,
    }

    impl MockFetcher {
        fn new(html: String) -> Self {
            Self { html, should_fail: false }
        }

        fn failing() -> Self {
            Self { html: String::new(), should_fail: true }
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn product_page(&self, _asin: &str) -> Result<String> {
            if self.should_fail {
                anyhow::bail!("Simulated page load timeout")
            } else {
                Ok(self.html.clone())
            }
        }

        fn product_url(&self, asin: &str) -> String {
            format!("https://www.amazon.in/dp/{}", asin)
        }
    }

    fn make_test_config() -> Config {
        let mut config = Config::default();
        config.format = OutputFormat::Json;
        config
    }

    fn make_page(primary: &str) -> String {
        format!(
            r#"<html><body>
                <span id="productTitle">Apple iPhone 15 (128 GB)</span>
                <div id="corePriceDisplay_desktop_feature_div">
                    <span class="a-price"><span class="a-offscreen">{}</span></span>
                </div>
                <span class="a-price"><span class="a-offscreen">₹3,125</span></span>
            </body></html>"#,
            primary
        )
    }

    fn asin() -> Vec<String> {
        vec!["B0CHX2F5QT".to_string()]
    }

    fn parse(output: &str) -> serde_json::Value {
        serde_json::from_str(output).unwrap()
    }

    #[test]
    fn test_normalize_asin() {
        assert_eq!(normalize_asin("  b0chx2f5qt ").unwrap(), "B0CHX2F5QT");
        assert!(normalize_asin("SHORT").unwrap_err().to_string().contains("Invalid ASIN"));
        assert!(normalize_asin("B0CHX2F5Q!").is_err());
        assert!(normalize_asin("TOOLONGASIN12345").is_err());
    }

    #[tokio::test]
    async fn test_scrape_single() {
        let client = MockFetcher::new(make_page("₹69,900.00"));
        let cmd = ScrapeCommand::new(make_test_config());

        let out = parse(&cmd.execute_with(&client, None, &asin()).await.unwrap());
        assert_eq!(out["source"], "B0CHX2F5QT");
        assert_eq!(out["price"], 69900);
        assert_eq!(out["phase"], "targeted");
        assert_eq!(out["title"], "Apple iPhone 15 (128 GB)");
        assert_eq!(out["recorded"], false);
    }

    #[tokio::test]
    async fn test_scrape_unknown_price_is_not_an_error() {
        let client = MockFetcher::new(make_page("Currently unavailable"));
        let cmd = ScrapeCommand::new(make_test_config());

        let out = parse(&cmd.execute_with(&client, None, &asin()).await.unwrap());
        assert!(out["price"].is_null());
    }

    #[tokio::test]
    async fn test_scrape_fetch_failure_is_an_error() {
        let cmd = ScrapeCommand::new(make_test_config());
        let err = cmd
            .execute_with(&MockFetcher::failing(), None, &["B0CHX2F5QT".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn test_scrape_category_band() {
        let mut config = make_test_config();
        let emi = PriceBand { low: 1_000, high: 5_000 };
        config.extractor.categories.insert("emi".to_string(), emi);
        let cmd = ScrapeCommand::new(config).category(Some("emi".to_string()));

        let client = MockFetcher::new(make_page("₹69,900.00"));
        let out = parse(&cmd.execute_with(&client, None, &asin()).await.unwrap());
        // 69,900 is out of this band; the lone fallback in band is the EMI figure
        assert_eq!(out["price"], 3125);
        assert_eq!(out["phase"], "median");
    }

    #[tokio::test]
    async fn test_scrape_batch_skips_invalid() {
        let client = MockFetcher::new(make_page("₹69,900.00"));
        let cmd = ScrapeCommand::new(make_test_config());

        let asins = vec!["B0CHX2F5QT".to_string(), "SHORT".to_string(), "B0CHX1W1XY".to_string()];
        let out = parse(&cmd.execute_with(&client, None, &asins).await.unwrap());
        assert_eq!(out.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_scrape_batch_skips_fetch_failures() {
        let cmd = ScrapeCommand::new(make_test_config());
        let asins = vec!["B0CHX2F5QT".to_string(), "B0CHX1W1XY".to_string()];
        let out = parse(&cmd.execute_with(&MockFetcher::failing(), None, &asins).await.unwrap());
        assert!(out.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scrape_records_offer() {
        let store = Store::in_memory().await.unwrap();
        store
            .create_product(
                &NewProduct {
                    slug: "iphone-15".to_string(),
                    name: "iPhone 15".to_string(),
                    category: "phones".to_string(),
                    image_url: "/iphone.png".to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap();
        store
            .create_seller(&NewSeller {
                name: "Amazon".to_string(),
                is_authorised: true,
                base_url: "https://www.amazon.in".to_string(),
                score: 80,
                notes: String::new(),
            })
            .await
            .unwrap();

        let target = RecordTarget {
            product_slug: "iphone-15".to_string(),
            seller_name: "Amazon".to_string(),
            warranty_type: "Brand warranty".to_string(),
            return_days: 7,
        };
        let cmd = ScrapeCommand::new(make_test_config()).record(Some(target));
        let client = MockFetcher::new(make_page("₹69,900.00"));

        let out =
            parse(&cmd.execute_with(&client, Some(&store), &asin()).await.unwrap());
        assert_eq!(out["recorded"], true);

        let offers = store.list_offers().await.unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].offer.price_inr, 69900);
        assert_eq!(offers[0].offer.product_url, "https://www.amazon.in/dp/B0CHX2F5QT");
        assert_eq!(offers[0].offer.return_days, 7);
    }

    #[tokio::test]
    async fn test_scrape_record_unknown_product() {
        let store = Store::in_memory().await.unwrap();
        let target = RecordTarget {
            product_slug: "missing".to_string(),
            seller_name: "Amazon".to_string(),
            warranty_type: "Brand warranty".to_string(),
            return_days: 0,
        };
        let cmd = ScrapeCommand::new(make_test_config()).record(Some(target));
        let client = MockFetcher::new(make_page("₹69,900.00"));

        let err = cmd
            .execute_with(&client, Some(&store), &["B0CHX2F5QT".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown product slug"));
    }
}
