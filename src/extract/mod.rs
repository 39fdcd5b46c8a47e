//! Price extraction from product page text.
//!
//! A product page shows many prices at once (EMI breakdowns, accessories,
//! bundles). Extraction runs in two phases:
//!
//! 1. **Targeted**: the primary price locations are tried in order and the
//!    first value inside the plausibility band wins.
//! 2. **Fallback**: every price-like fragment is parsed, out-of-band values
//!    are dropped, and the median of the rest is returned.
//!
//! A page with no in-band candidate yields `None`. That is a normal outcome,
//! not an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Inclusive range of plausible prices, in currency subunits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBand {
    pub low: i64,
    pub high: i64,
}

impl PriceBand {
    /// Creates a band, rejecting inverted bounds.
    pub fn new(low: i64, high: i64) -> Result<Self, String> {
        let band = Self { low, high };
        band.validate()?;
        Ok(band)
    }

    /// Checks that `low <= high`.
    pub fn validate(&self) -> Result<(), String> {
        if self.low > self.high {
            return Err(format!("Invalid price band: low {} exceeds high {}", self.low, self.high));
        }
        Ok(())
    }

    /// Returns true if the value lies inside the band (bounds included).
    pub fn contains(&self, value: i64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

impl Default for PriceBand {
    fn default() -> Self {
        Self { low: 30_000, high: 300_000 }
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.low, self.high)
    }
}

/// Texts pulled from a page, ready for extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Texts from the primary price locations, most specific first.
    pub primary: Vec<String>,
    /// Every price-like fragment on the page.
    pub fallback: Vec<String>,
}

/// Which phase produced an extracted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Targeted,
    Median,
}

/// A confident price and how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extracted {
    pub price: i64,
    pub phase: Phase,
    /// Number of in-band fallback values the median was taken over (0 for targeted).
    pub sample_size: usize,
}

/// Pure price extractor over text candidates.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    band: PriceBand,
    separator: char,
}

impl Extractor {
    /// Creates an extractor with the comma thousands convention.
    pub fn new(band: PriceBand) -> Self {
        Self { band, separator: ',' }
    }

    /// Overrides the thousands separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn band(&self) -> PriceBand {
        self.band
    }

    /// Returns the best-guess price, or `None` when nothing plausible was found.
    pub fn extract(&self, candidates: &Candidates) -> Option<i64> {
        self.extract_detailed(candidates).map(|e| e.price)
    }

    /// Same as [`Extractor::extract`] but reports which phase decided.
    pub fn extract_detailed(&self, candidates: &Candidates) -> Option<Extracted> {
        for text in &candidates.primary {
            let Some(value) = self.parse_amount(text) else {
                trace!("No amount in primary text {:?}", text);
                continue;
            };

            if self.band.contains(value) {
                debug!("Targeted price {} from {:?}", value, text);
                return Some(Extracted { price: value, phase: Phase::Targeted, sample_size: 0 });
            }

            trace!("Primary value {} outside band {}", value, self.band);
        }

        let mut values: Vec<i64> = candidates
            .fallback
            .iter()
            .filter_map(|t| self.parse_amount(t))
            .filter(|v| self.band.contains(*v))
            .collect();

        debug!(
            "Fallback: {} of {} fragments in band {}",
            values.len(),
            candidates.fallback.len(),
            self.band
        );

        let sample_size = values.len();
        median(&mut values).map(|price| Extracted { price, phase: Phase::Median, sample_size })
    }

    /// Parses the first run of digits and separators in `text`.
    ///
    /// The run starts at the first digit or separator and stops at the first
    /// character that is neither, so `"₹1,34,900.00"` parses as `134900`.
    /// A run made only of separators (`"Save , ₹5,000"`) yields `None`.
    pub fn parse_amount(&self, text: &str) -> Option<i64> {
        let start = text.find(|c: char| c.is_ascii_digit() || c == self.separator)?;

        let digits: String = text[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == self.separator)
            .filter(|c| c.is_ascii_digit())
            .collect();

        digits.parse().ok()
    }
}

/// Median of the values, averaging the middle pair (rounded half up) for even counts.
pub fn median(values: &mut [i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }

    values.sort_unstable();
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        let (a, b) = (values[mid - 1], values[mid]);
        let gap = b - a;
        Some(a + gap / 2 + gap % 2)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new(PriceBand::default())
    }

    fn candidates(primary: &[&str], fallback: &[&str]) -> Candidates {
        Candidates {
            primary: primary.iter().map(|s| s.to_string()).collect(),
            fallback: fallback.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_amount() {
        let ex = extractor();
        assert_eq!(ex.parse_amount("₹1,34,900.00"), Some(134900));
        assert_eq!(ex.parse_amount("₹69,900"), Some(69900));
        assert_eq!(ex.parse_amount("Rs. 52000"), Some(52000));
        assert_eq!(ex.parse_amount("M.R.P.: ₹79,900"), Some(79900));
        assert_eq!(ex.parse_amount("no digits here"), None);
        assert_eq!(ex.parse_amount(""), None);
    }

    #[test]
    fn test_parse_amount_takes_first_run_only() {
        let ex = extractor();
        assert_eq!(ex.parse_amount("₹3,125/month for 24 months"), Some(3125));
    }

    #[test]
    fn test_parse_amount_separator_only_run_is_skipped() {
        let ex = extractor();
        assert_eq!(ex.parse_amount("Save , ₹5,000"), None);
        assert_eq!(ex.parse_amount(", ₹45,000"), None);
        assert_eq!(ex.parse_amount(",45,000"), Some(45000));
    }

    #[test]
    fn test_separator_only_text_falls_through() {
        let c = candidates(&[", ₹45,000", "₹69,900"], &[]);
        let result = extractor().extract_detailed(&c).unwrap();
        assert_eq!(result.price, 69900);
        assert_eq!(result.phase, Phase::Targeted);
    }

    #[test]
    fn test_parse_amount_overflow() {
        let ex = extractor();
        assert_eq!(ex.parse_amount("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_amount_custom_separator() {
        let ex = extractor().with_separator('.');
        assert_eq!(ex.parse_amount("1.234,56 €"), Some(1234));
        // Comma is not part of the run under the dot convention
        assert_eq!(ex.parse_amount("1,234"), Some(1));
    }

    #[test]
    fn test_targeted_wins_over_other_prices() {
        let c = candidates(&["₹69,900.00"], &["₹45,000", "₹52,000", "₹61,000", "₹1,499"]);
        let result = extractor().extract_detailed(&c).unwrap();
        assert_eq!(result.price, 69900);
        assert_eq!(result.phase, Phase::Targeted);
    }

    #[test]
    fn test_targeted_skips_out_of_band_locations() {
        // EMI figure in the first location, real price in the second
        let c = candidates(&["₹3,125", "₹74,900"], &[]);
        assert_eq!(extractor().extract(&c), Some(74900));
    }

    #[test]
    fn test_targeted_skips_unparseable_locations() {
        let c = candidates(&["Currently unavailable", "₹88,000"], &[]);
        assert_eq!(extractor().extract(&c), Some(88000));
    }

    #[test]
    fn test_median_odd() {
        let c = candidates(&[], &["₹45,000", "₹52,000", "₹61,000"]);
        let result = extractor().extract_detailed(&c).unwrap();
        assert_eq!(result.price, 52000);
        assert_eq!(result.phase, Phase::Median);
        assert_eq!(result.sample_size, 3);
    }

    #[test]
    fn test_median_at_i64_bounds() {
        assert_eq!(median(&mut [i64::MAX - 1, i64::MAX]), Some(i64::MAX));
        assert_eq!(median(&mut [0, i64::MAX]), Some(i64::MAX / 2 + 1));
        assert_eq!(median(&mut [7, 7]), Some(7));
    }

    #[test]
    fn test_median_even() {
        let c = candidates(&[], &["₹52,000", "₹45,000"]);
        assert_eq!(extractor().extract(&c), Some(48500));
    }

    #[test]
    fn test_median_ignores_out_of_band() {
        let c = candidates(
            &["₹999"],
            &["₹1,499", "₹45,000", "₹9,99,999", "₹61,000", "₹52,000"],
        );
        assert_eq!(extractor().extract(&c), Some(52000));
    }

    #[test]
    fn test_nothing_in_band() {
        let c = candidates(&["₹2,999"], &["₹1,499", "₹10,00,000", "free"]);
        assert_eq!(extractor().extract(&c), None);
        assert_eq!(extractor().extract(&Candidates::default()), None);
    }

    #[test]
    fn test_band_bounds_inclusive() {
        let band = PriceBand::default();
        assert!(band.contains(30_000));
        assert!(band.contains(300_000));
        assert!(!band.contains(29_999));
        assert!(!band.contains(300_001));
    }

    #[test]
    fn test_band_validation() {
        assert!(PriceBand::new(10, 20).is_ok());
        assert!(PriceBand::new(20, 20).is_ok());
        let err = PriceBand::new(30, 20).unwrap_err();
        assert!(err.contains("exceeds"));
    }

    #[test]
    fn test_custom_band() {
        let ex = Extractor::new(PriceBand::new(1_000, 5_000).unwrap());
        let c = candidates(&["₹69,900"], &["₹1,499", "₹2,499"]);
        assert_eq!(ex.extract(&c), Some(1999));
    }

    #[test]
    fn test_median_helper() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [7]), Some(7));
        assert_eq!(median(&mut [3, 1, 2]), Some(2));
        assert_eq!(median(&mut [1, 2]), Some(2));
        assert_eq!(median(&mut [4, 1, 3, 2]), Some(3));
    }
}
