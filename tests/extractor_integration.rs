//! Integration tests for page scanning and price extraction using fixture files.

use price_compare::amazon::Parser;
use price_compare::commands::extract::extract_html;
use price_compare::config::Config;
use price_compare::extract::{Extractor, Phase, PriceBand};

const PRODUCT_FIXTURE: &str = include_str!("fixtures/product_page.html");
const NO_BUYBOX_FIXTURE: &str = include_str!("fixtures/product_page_no_buybox.html");
const ROBOT_FIXTURE: &str = include_str!("fixtures/robot_check.html");

#[test]
fn test_targeted_price_wins_over_page_noise() {
    let page = Parser::new().scan(PRODUCT_FIXTURE);
    assert_eq!(page.title.as_deref(), Some("Apple iPhone 15 (128 GB) - Black"));
    assert!(!page.robot_check);
    assert_eq!(page.candidates.primary[0], "₹69,900.00");

    let result = Extractor::new(PriceBand::default()).extract_detailed(&page.candidates).unwrap();
    assert_eq!(result.price, 69900);
    assert_eq!(result.phase, Phase::Targeted);
}

#[test]
fn test_median_fallback_without_buybox() {
    let page = Parser::new().scan(NO_BUYBOX_FIXTURE);
    assert!(page.candidates.primary.is_empty());
    assert_eq!(page.candidates.fallback.len(), 5);

    // EMI and accessory prices fall outside the band; median of the three offers
    let result = Extractor::new(PriceBand::default()).extract_detailed(&page.candidates).unwrap();
    assert_eq!(result.price, 124499);
    assert_eq!(result.phase, Phase::Median);
    assert_eq!(result.sample_size, 3);
}

#[test]
fn test_narrow_band_changes_the_answer() {
    let page = Parser::new().scan(PRODUCT_FIXTURE);
    let band = PriceBand::new(1_000, 5_000).unwrap();

    // 69,900 and 79,900 are out of band; accessories and EMI remain
    let result = Extractor::new(band).extract_detailed(&page.candidates).unwrap();
    assert_eq!(result.price, 2199);
    assert_eq!(result.phase, Phase::Median);
}

#[test]
fn test_robot_check_yields_unknown() {
    let page = Parser::new().scan(ROBOT_FIXTURE);
    assert!(page.robot_check);
    assert!(page.title.is_none());
    assert_eq!(Extractor::new(PriceBand::default()).extract(&page.candidates), None);
}

#[test]
fn test_extract_html_report() {
    let report = extract_html(&Config::default(), "no_buybox.html", NO_BUYBOX_FIXTURE, None);
    assert_eq!(report.price, Some(124499));
    assert_eq!(report.phase, Some(Phase::Median));
    assert_eq!(report.band, PriceBand::default());
    assert!(!report.recorded);
}

#[test]
fn test_extract_html_category_band() {
    let mut config = Config::default();
    let accessories = PriceBand { low: 500, high: 5_000 };
    config.extractor.categories.insert("accessories".to_string(), accessories);

    let report = extract_html(&config, "page.html", PRODUCT_FIXTURE, Some("accessories"));
    // primary 69,900 is out of band, so the fallback median applies
    assert_eq!(report.price, Some(2199));
    assert_eq!(report.band.high, 5_000);
}
