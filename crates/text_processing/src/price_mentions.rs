//! Monetary mentions in listing titles and snippets
//!
//! Recognized notations, tried in this order:
//! 1. crore (`1.2 cr`, `₹2 crore`) → ×10,000,000
//! 2. lakh (`85 lakh`, `90 L`, `75 lacs`) → ×100,000
//! 3. `₹ 95,00,000`
//! 4. `Rs. 95,00,000`
//! 5. `INR 9500000`
//!
//! For each notation only the first value that falls inside the plausibility
//! band is taken from a given text, so one text yields at most five prices.

use once_cell::sync::Lazy;
use regex::Regex;

static CRORE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:crores?|cr)\b").unwrap());

static LAKH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:lakhs?|lacs?|l)\b").unwrap());

static RUPEE_SYMBOL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"₹\s*(\d[\d,]*)").unwrap());

static RS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\brs\.?\s*(\d[\d,]*)").unwrap());

static INR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\binr\s*(\d[\d,]*)").unwrap());

/// Inclusive range of prices considered plausible for a listing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceBand {
    fn default() -> Self {
        Self {
            min: 500_000.0,
            max: 1_000_000_000.0,
        }
    }
}

impl PriceBand {
    pub fn contains(&self, price: f64) -> bool {
        price.is_finite() && price >= self.min && price <= self.max
    }
}

/// Extracts listing prices (in rupees) from free text
#[derive(Debug, Clone, Default)]
pub struct PriceMentionExtractor {
    band: PriceBand,
}

impl PriceMentionExtractor {
    pub fn new(band: PriceBand) -> Self {
        Self { band }
    }

    pub fn band(&self) -> PriceBand {
        self.band
    }

    /// Prices mentioned in one text
    pub fn extract(&self, text: &str) -> Vec<f64> {
        let patterns: [(&Regex, f64); 5] = [
            (&CRORE_PATTERN, 10_000_000.0),
            (&LAKH_PATTERN, 100_000.0),
            (&RUPEE_SYMBOL_PATTERN, 1.0),
            (&RS_PATTERN, 1.0),
            (&INR_PATTERN, 1.0),
        ];

        patterns
            .iter()
            .filter_map(|(pattern, multiplier)| {
                pattern.captures_iter(text).find_map(|caps| {
                    let value: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
                    let price = value * multiplier;
                    self.band.contains(price).then_some(price)
                })
            })
            .collect()
    }

    /// Prices mentioned across many texts, in encounter order
    pub fn extract_all<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> Vec<f64> {
        texts.into_iter().flat_map(|t| self.extract(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crore_and_lakh() {
        let extractor = PriceMentionExtractor::default();
        assert_eq!(extractor.extract("3 BHK for ₹1.2 Cr in Kharadi"), vec![12_000_000.0]);
        assert_eq!(extractor.extract("Flat at 85 lakh, negotiable"), vec![8_500_000.0]);
        assert_eq!(extractor.extract("only 90 L"), vec![9_000_000.0]);
        assert_eq!(extractor.extract("priced 75 lacs"), vec![7_500_000.0]);
    }

    #[test]
    fn test_raw_rupee_figures() {
        let extractor = PriceMentionExtractor::default();
        assert_eq!(extractor.extract("Price ₹ 95,00,000 onwards"), vec![9_500_000.0]);
        assert_eq!(extractor.extract("Rs. 6500000 all inclusive"), vec![6_500_000.0]);
        assert_eq!(extractor.extract("INR 7,200,000"), vec![7_200_000.0]);
    }

    #[test]
    fn test_out_of_band_values_skipped() {
        let extractor = PriceMentionExtractor::default();
        // ₹ 4500 is a per-sqft rate, below the band; the crore value is kept
        assert_eq!(extractor.extract("₹ 4500/sqft, total 1.1 crore"), vec![11_000_000.0]);
        assert!(extractor.extract("Rs 250 crore township").is_empty());
        assert!(extractor.extract("1500 sqft, 2 lifts").is_empty());
    }

    #[test]
    fn test_first_in_band_value_per_notation() {
        let extractor = PriceMentionExtractor::default();
        let prices = extractor.extract("from 80 lakh to 95 lakh, or 1.5 cr for 4 BHK");
        assert_eq!(prices, vec![15_000_000.0, 8_000_000.0]);
    }

    #[test]
    fn test_extract_all() {
        let extractor = PriceMentionExtractor::default();
        let prices = extractor.extract_all(["60 lakh", "no price here", "1 crore"]);
        assert_eq!(prices, vec![6_000_000.0, 10_000_000.0]);
    }
}
