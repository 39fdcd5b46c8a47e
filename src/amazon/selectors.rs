//! CSS selectors for Amazon product pages.
//!
//! Update this file when Amazon changes their HTML structure.
//!
//! **Update process**: when extraction starts returning unknown prices for
//! pages that clearly show one, capture the HTML, adjust the selectors, and
//! add it as a test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Primary "price to pay" locations, most specific first.
///
/// Order matters: the extractor takes the first in-band value, so the
/// structurally specific containers must come before generic ones.
pub static PRIMARY_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "#corePriceDisplay_desktop_feature_div .a-price .a-offscreen",
        "#corePrice_feature_div .a-price .a-offscreen",
        "#apex_desktop .a-price .a-offscreen",
        "#tp-tool-tip-subtotal-price-value",
        "#priceblock_dealprice",
        "#priceblock_ourprice",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Every price fragment on the page (EMI, accessories, bundles included).
pub static ANY_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".a-price .a-offscreen").unwrap());

/// Product title.
pub static TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "#productTitle, \
         #title span",
    )
    .unwrap()
});

/// Robot-check / CAPTCHA markers.
pub static ROBOT_CHECK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "form[action*='validateCaptcha'], \
         img[src*='captcha']",
    )
    .unwrap()
});
