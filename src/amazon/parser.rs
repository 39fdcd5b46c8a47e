//! HTML scanner that turns an Amazon product page into price candidates.

use crate::amazon::selectors;
use crate::extract::Candidates;
use scraper::{ElementRef, Html};
use tracing::{debug, trace, warn};

/// What a product page offered up for extraction.
#[derive(Debug, Clone, Default)]
pub struct ScannedPage {
    pub title: Option<String>,
    pub candidates: Candidates,
    /// The page looks like a robot check; prices are probably missing.
    pub robot_check: bool,
}

/// Scans product page HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Collects the primary and fallback price texts from a product page.
    ///
    /// Each primary location contributes the text of its first match only.
    /// Missing locations are skipped.
    pub fn scan(&self, html: &str) -> ScannedPage {
        let document = Html::parse_document(html);

        let robot_check = document.select(&selectors::ROBOT_CHECK).next().is_some();
        if robot_check {
            warn!("Page looks like a robot check; price extraction will likely fail");
        }

        let title = document
            .select(&selectors::TITLE)
            .next()
            .map(text_of)
            .filter(|t| !t.is_empty());

        let primary: Vec<String> = selectors::PRIMARY_PRICE
            .iter()
            .filter_map(|sel| document.select(sel).next())
            .map(text_of)
            .filter(|t| !t.is_empty())
            .collect();

        let fallback: Vec<String> =
            document.select(&selectors::ANY_PRICE).map(text_of).filter(|t| !t.is_empty()).collect();

        trace!("Primary texts: {:?}", primary);
        debug!(
            "Scanned page: {} primary, {} fallback price texts (first 20: {:?})",
            primary.len(),
            fallback.len(),
            fallback.iter().take(20).collect::<Vec<_>>()
        );

        ScannedPage { title, candidates: Candidates { primary, fallback }, robot_check }
    }
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
