//! Extract command: run price extraction on a saved product page.

use crate::amazon::Parser;
use crate::config::Config;
use crate::format::{Formatter, ScrapeReport};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Extracts a price from an HTML file on disk.
pub fn extract_file(config: &Config, path: &Path, category: Option<&str>) -> Result<String> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page: {}", path.display()))?;

    let report = extract_html(config, &path.display().to_string(), &html, category);
    Ok(Formatter::new(config.format).format_report(&report))
}

/// Extracts a price from page HTML already in memory.
pub fn extract_html(
    config: &Config,
    source: &str,
    html: &str,
    category: Option<&str>,
) -> ScrapeReport {
    let page = Parser::new().scan(html);
    let extractor = config.extractor.extractor_for(category);
    let extracted = extractor.extract_detailed(&page.candidates);

    if extracted.is_none() {
        info!("No confident price in {}", source);
    }

    ScrapeReport {
        source: source.to_string(),
        url: None,
        title: page.title,
        price: extracted.map(|e| e.price),
        phase: extracted.map(|e| e.phase),
        band: extractor.band(),
        robot_check: page.robot_check,
        recorded: false,
    }
}
