//! Output formatting for scrape reports (table, JSON, CSV).

use crate::config::OutputFormat;
use crate::extract::{Phase, PriceBand};
use serde::Serialize;

/// Outcome of extracting a price from one page.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    /// ASIN or file path the page came from
    pub source: String,
    pub url: Option<String>,
    pub title: Option<String>,
    /// Extracted price in currency subunits; `None` when unknown
    pub price: Option<i64>,
    pub phase: Option<Phase>,
    pub band: PriceBand,
    pub robot_check: bool,
    /// Whether the price was written to an offer
    pub recorded: bool,
}

/// Formats reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single report.
    pub fn format_report(&self, report: &ScrapeReport) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_single(report),
            OutputFormat::Csv => self.csv(std::slice::from_ref(report)),
        }
    }

    /// Formats several reports.
    pub fn format_reports(&self, reports: &[ScrapeReport]) -> String {
        if reports.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => csv_header(),
                OutputFormat::Table => "No pages scraped.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => self.table_many(reports),
            OutputFormat::Csv => self.csv(reports),
        }
    }

    fn table_single(&self, report: &ScrapeReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Source:  {}", report.source));
        if let Some(url) = &report.url {
            lines.push(format!("URL:     {}", url));
        }
        if let Some(title) = &report.title {
            lines.push(format!("Title:   {}", title));
        }

        let price = match (report.price, report.phase) {
            (Some(p), Some(Phase::Median)) => format!("{} (median of page prices)", format_inr(p)),
            (Some(p), _) => format_inr(p),
            (None, _) => "unknown".to_string(),
        };
        lines.push(format!("Price:   {}", price));
        lines.push(format!(
            "Band:    {} - {}",
            format_inr(report.band.low),
            format_inr(report.band.high)
        ));

        if report.robot_check {
            lines.push("Warning: page looks like a robot check".to_string());
        }
        if report.recorded {
            lines.push("Offer:   recorded".to_string());
        }

        lines.join("\n")
    }

    fn table_many(&self, reports: &[ScrapeReport]) -> String {
        let source_width = reports.iter().map(|r| r.source.len()).max().unwrap_or(6).max(6);
        let price_width = 14;

        let mut lines = Vec::new();
        lines.push(format!(
            "{:<source_width$}  {:>price_width$}  {:<8}  Title",
            "Source", "Price", "Phase"
        ));
        lines.push(format!(
            "{:-<source_width$}  {:->price_width$}  {:-<8}  {:-<5}",
            "", "", "", ""
        ));

        for r in reports {
            let price = r.price.map(format_inr).unwrap_or_else(|| "unknown".to_string());
            let phase = match r.phase {
                Some(Phase::Targeted) => "targeted",
                Some(Phase::Median) => "median",
                None => "-",
            };
            lines.push(format!(
                "{:<source_width$}  {:>price_width$}  {:<8}  {}",
                r.source,
                price,
                phase,
                r.title.as_deref().map(|t| truncate(t, 60)).unwrap_or_default()
            ));
        }

        let found = reports.iter().filter(|r| r.price.is_some()).count();
        lines.push(String::new());
        lines.push(format!("{} of {} pages with a price", found, reports.len()));

        lines.join("\n")
    }

    fn csv(&self, reports: &[ScrapeReport]) -> String {
        let mut out = csv_header();
        for r in reports {
            out.push('\n');
            out.push_str(&format!(
                "{},{},{},{},{}",
                escape_csv(&r.source),
                r.price.map(|p| p.to_string()).unwrap_or_default(),
                r.phase
                    .map(|p| match p {
                        Phase::Targeted => "targeted",
                        Phase::Median => "median",
                    })
                    .unwrap_or_default(),
                escape_csv(r.url.as_deref().unwrap_or_default()),
                escape_csv(r.title.as_deref().unwrap_or_default()),
            ));
        }
        out
    }
}

fn csv_header() -> String {
    "source,price,phase,url,title".to_string()
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Formats rupees with Indian digit grouping: `134900` -> `₹1,34,900`.
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let sign = if amount < 0 { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{}₹{}", sign, digits);
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{}₹{},{}", sign, groups.join(","), tail)
}
