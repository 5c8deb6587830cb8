//! Property entity extraction
//!
//! Pulls the bedroom count, floor area and location out of a free-text
//! property description:
//! - Bedroom count: `3 BHK`, `2bhk`, `4 bedrooms`, `1 br`
//! - Floor area: `1500 sqft`, `1,200 sq ft`, `90 sqm` (converted to sqft)
//! - Location: the first `in|at|near <place>` clause, otherwise the last
//!   comma-separated clause without digits. A clause that names no known
//!   city continues into the following comma clauses until one does
//!   (`in Baner, Pune`). Filler words (`with`, `near`, `at`, `in`) end it.
//!
//! Extraction is best-effort and total: unparseable input yields an
//! `ExtractedEntities` with every field empty, never an error.
//!
//! # Example
//!
//! ```ignore
//! use realty_text_processing::EntityExtractor;
//!
//! let extractor = EntityExtractor::with_known_cities(vec!["Pune".to_string()]);
//! let entities = extractor.extract("3 BHK apartment in Kharadi Pune, 1500 sqft");
//!
//! assert_eq!(entities.bedroom_count, Some(3));
//! assert_eq!(entities.city.as_deref(), Some("Pune"));
//! assert_eq!(entities.area.as_deref(), Some("Kharadi"));
//! ```

use once_cell::sync::Lazy;
use realty_core::PropertyQuery;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Square metres → square feet
pub const SQM_TO_SQFT: f64 = 10.7639;

static BEDROOM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*(?:bhk|bedrooms?|br)\b").unwrap());

static AREA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(sq\.?\s*ft|sqft|sqm|sq\.?\s*m|square\s*feet|square\s*met(?:er|re)s?|sft|sf)\b")
        .unwrap()
});

static LOCATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:in|at|near)\s+([A-Za-z][A-Za-z .'\-]*)").unwrap()
});

/// Words that end a location phrase
const PHRASE_STOP_WORDS: &[&str] = &["with", "near", "at", "in"];

/// Cut a phrase at its first stop word; the flag reports whether it was cut
fn cut_at_stop_word(phrase: &str) -> (String, bool) {
    let mut kept = Vec::new();
    for word in phrase.split_whitespace() {
        if PHRASE_STOP_WORDS.iter().any(|stop| word.eq_ignore_ascii_case(stop)) {
            return (kept.join(" "), true);
        }
        kept.push(word);
    }
    (kept.join(" "), false)
}

fn clean_phrase(phrase: &str) -> &str {
    phrase.trim().trim_end_matches(['.', '-', '\'']).trim()
}

/// Entities extracted from a property description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub raw_text: String,
    /// Location phrase as written
    pub location: Option<String>,
    /// City, canonical spelling when it is a known city
    pub city: Option<String>,
    /// Remaining words of the location phrase after the city
    pub area: Option<String>,
    pub bedroom_count: Option<u32>,
    pub size_sqft: Option<f64>,
}

/// Fallback values for fields the text did not mention
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefaults {
    pub city: String,
    pub bedrooms: u32,
    pub size_sqft: f64,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            city: "Mumbai".to_string(),
            bedrooms: 2,
            size_sqft: 1000.0,
        }
    }
}

impl ExtractedEntities {
    /// Check if any entities were extracted
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.bedroom_count.is_none() && self.size_sqft.is_none()
    }

    /// Build the request's property query, filling gaps from `defaults`
    pub fn to_query(&self, defaults: &QueryDefaults) -> PropertyQuery {
        PropertyQuery {
            raw_text: self.raw_text.clone(),
            city: self.city.clone().unwrap_or_else(|| defaults.city.clone()),
            area: self.area.clone(),
            bedroom_count: self.bedroom_count.unwrap_or(defaults.bedrooms),
            floor_area_sqft: self.size_sqft.unwrap_or(defaults.size_sqft),
        }
    }
}

#[derive(Debug, Clone)]
struct KnownCity {
    canonical: String,
    words: Vec<String>,
}

/// Regex-based property entity extractor
///
/// Use `with_known_cities()` to let the extractor split a location phrase
/// such as "Kharadi Pune" into area and city.
#[derive(Debug, Clone, Default)]
pub struct EntityExtractor {
    /// Longest names first so "Navi Mumbai" wins over "Mumbai"
    known_cities: Vec<KnownCity>,
}

fn words_lower(text: &str) -> Vec<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

impl EntityExtractor {
    /// Create an extractor with no known cities
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor that recognizes the given city names
    pub fn with_known_cities(cities: Vec<String>) -> Self {
        let mut known_cities: Vec<KnownCity> = cities
            .into_iter()
            .map(|name| KnownCity {
                words: words_lower(&name),
                canonical: name,
            })
            .filter(|c| !c.words.is_empty())
            .collect();
        known_cities.sort_by(|a, b| b.words.len().cmp(&a.words.len()));

        Self { known_cities }
    }

    /// Extract all entities from text
    pub fn extract(&self, text: &str) -> ExtractedEntities {
        let text = text.trim();
        let location = self.extract_location(text);
        let (city, area) = match location.as_deref() {
            Some(phrase) => {
                let (city, area) = self.split_location(phrase);
                (Some(city), area)
            }
            None => (None, None),
        };

        let entities = ExtractedEntities {
            raw_text: text.to_string(),
            location,
            city,
            area,
            bedroom_count: self.extract_bedrooms(text),
            size_sqft: self.extract_size_sqft(text),
        };
        tracing::debug!(?entities, "Extracted property entities");
        entities
    }

    /// Bedroom count, first match wins
    pub fn extract_bedrooms(&self, text: &str) -> Option<u32> {
        let caps = BEDROOM_PATTERN.captures(text)?;
        caps.get(1)?.as_str().parse().ok()
    }

    /// Floor area in square feet
    pub fn extract_size_sqft(&self, text: &str) -> Option<f64> {
        let caps = AREA_PATTERN.captures(text)?;
        let value: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
        let unit = caps.get(2)?.as_str().to_lowercase();

        let metric = unit.contains("met") || unit.ends_with('m');
        let sqft = if metric { value * SQM_TO_SQFT } else { value };

        (sqft.is_finite() && sqft > 0.0).then_some(sqft)
    }

    /// Location phrase
    pub fn extract_location(&self, text: &str) -> Option<String> {
        if let Some(phrase) = self.location_clause(text) {
            return Some(phrase);
        }

        text.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty() && !part.chars().any(|c| c.is_ascii_digit()))
            .last()
            .map(str::to_string)
    }

    /// First non-empty `in|at|near` phrase, extended over the comma clauses
    /// that follow it when it names no known city
    fn location_clause(&self, text: &str) -> Option<String> {
        for caps in LOCATION_PATTERN.captures_iter(text) {
            let Some(group) = caps.get(1) else {
                continue;
            };
            let (phrase, cut) = cut_at_stop_word(clean_phrase(group.as_str()));
            if phrase.is_empty() {
                continue;
            }
            if cut || self.find_city(&phrase).is_some() {
                return Some(phrase);
            }
            return Some(self.extend_with_clauses(phrase, &text[group.end()..]));
        }
        None
    }

    /// Append following digit-free clauses up to the first that names a known city
    fn extend_with_clauses(&self, phrase: String, rest: &str) -> String {
        let mut clauses = rest.split(',');
        if clauses.next().map_or(true, |head| !head.trim().is_empty()) {
            return phrase;
        }

        let mut parts = vec![phrase.clone()];
        for clause in clauses {
            let clause = clean_phrase(clause);
            if clause.is_empty() || clause.chars().any(|c| c.is_ascii_digit()) {
                break;
            }
            let (clause, cut) = cut_at_stop_word(clause);
            if clause.is_empty() {
                break;
            }
            let names_city = self.find_city(&clause).is_some();
            parts.push(clause);
            if names_city {
                return parts.join(", ");
            }
            if cut {
                break;
            }
        }
        phrase
    }

    /// Known city inside a phrase: (city, index of its first word)
    fn find_city(&self, phrase: &str) -> Option<(&KnownCity, usize)> {
        let lowered = words_lower(&phrase.replace(',', " "));
        self.known_cities.iter().find_map(|city| {
            let n = city.words.len();
            if n > lowered.len() {
                return None;
            }
            (0..=lowered.len() - n)
                .find(|&i| lowered[i..i + n] == city.words[..])
                .map(|start| (city, start))
        })
    }

    /// Split a location phrase into (city, area)
    ///
    /// When the phrase contains a known city the remaining words become the
    /// area. Otherwise the whole phrase is treated as the city.
    pub fn split_location(&self, phrase: &str) -> (String, Option<String>) {
        let flat = phrase.replace(',', " ");
        let original: Vec<&str> = flat.split_whitespace().collect();

        match self.find_city(&flat) {
            Some((city, start)) => {
                let rest: Vec<&str> = original[..start]
                    .iter()
                    .chain(original[start + city.words.len()..].iter())
                    .copied()
                    .collect();
                let area = (!rest.is_empty()).then(|| rest.join(" "));
                (city.canonical.clone(), area)
            }
            None => (original.join(" "), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> EntityExtractor {
        EntityExtractor::with_known_cities(vec![
            "Mumbai".to_string(),
            "Navi Mumbai".to_string(),
            "Pune".to_string(),
        ])
    }

    #[test]
    fn test_reference_query() {
        let e = extractor().extract("3 BHK apartment in Kharadi Pune, 1500 sqft");
        assert_eq!(e.bedroom_count, Some(3));
        assert_eq!(e.size_sqft, Some(1500.0));
        assert_eq!(e.location.as_deref(), Some("Kharadi Pune"));
        assert_eq!(e.city.as_deref(), Some("Pune"));
        assert_eq!(e.area.as_deref(), Some("Kharadi"));
    }

    #[test]
    fn test_bedroom_variants() {
        let e = EntityExtractor::new();
        assert_eq!(e.extract_bedrooms("2bhk flat"), Some(2));
        assert_eq!(e.extract_bedrooms("4 Bedrooms villa"), Some(4));
        assert_eq!(e.extract_bedrooms("1 br studio"), Some(1));
        assert_eq!(e.extract_bedrooms("2 BHK or 3 BHK"), Some(2));
        assert_eq!(e.extract_bedrooms("spacious flat"), None);
    }

    #[test]
    fn test_area_units() {
        let e = EntityExtractor::new();
        assert_eq!(e.extract_size_sqft("1,200 sq ft"), Some(1200.0));
        assert_eq!(e.extract_size_sqft("950 sft"), Some(950.0));
        assert_eq!(e.extract_size_sqft("800 square feet"), Some(800.0));

        let sqm = e.extract_size_sqft("100 sqm").unwrap();
        assert!((sqm - 1076.39).abs() < 1e-9);
        let sqm = e.extract_size_sqft("50 square meters").unwrap();
        assert!((sqm - 538.195).abs() < 1e-9);

        assert_eq!(e.extract_size_sqft("3 BHK"), None);
    }

    #[test]
    fn test_location_fallback_to_last_clause() {
        let e = extractor().extract("2 BHK, 900 sqft, Baner, Pune");
        assert_eq!(e.location.as_deref(), Some("Pune"));
        assert_eq!(e.city.as_deref(), Some("Pune"));
        assert_eq!(e.area, None);
    }

    #[test]
    fn test_unknown_city_kept_whole() {
        let e = extractor().extract("flat near Lake Town Kolkata");
        assert_eq!(e.city.as_deref(), Some("Lake Town Kolkata"));
        assert_eq!(e.area, None);
    }

    #[test]
    fn test_case_insensitive_city_and_longest_match() {
        let e = extractor();
        assert_eq!(
            e.split_location("vashi navi mumbai"),
            ("Navi Mumbai".to_string(), Some("vashi".to_string()))
        );
        assert_eq!(e.split_location("MUMBAI"), ("Mumbai".to_string(), None));
    }

    #[test]
    fn test_empty_input_is_total() {
        let e = extractor().extract("");
        assert!(e.is_empty());
        assert_eq!(e.city, None);

        let e = extractor().extract("1234, 5678");
        assert!(e.location.is_none());
    }

    #[test]
    fn test_to_query_applies_defaults() {
        let query = extractor().extract("something nice").to_query(&QueryDefaults::default());
        assert_eq!(query.city, "something nice");
        assert_eq!(query.bedroom_count, 2);
        assert_eq!(query.floor_area_sqft, 1000.0);

        let query = extractor().extract("2, 3").to_query(&QueryDefaults::default());
        assert_eq!(query.city, "Mumbai");
    }

    #[test]
    fn test_area_then_city_clauses() {
        let e = extractor().extract("2 BHK flat in Baner, Pune");
        assert_eq!(e.location.as_deref(), Some("Baner, Pune"));
        assert_eq!(e.city.as_deref(), Some("Pune"));
        assert_eq!(e.area.as_deref(), Some("Baner"));

        let e = extractor().extract("3 BHK in Kharadi, Pune, 1500 sqft");
        assert_eq!(e.location.as_deref(), Some("Kharadi, Pune"));
        assert_eq!(e.city.as_deref(), Some("Pune"));
        assert_eq!(e.area.as_deref(), Some("Kharadi"));
        assert_eq!(e.size_sqft, Some(1500.0));
    }

    #[test]
    fn test_trailing_clauses_without_city_are_ignored() {
        let e = extractor().extract("3 BHK in Baner, east facing, ready to move");
        assert_eq!(e.location.as_deref(), Some("Baner"));
        assert_eq!(e.city.as_deref(), Some("Baner"));

        let e = extractor().extract("flat in Kharadi Pune, spacious");
        assert_eq!(e.location.as_deref(), Some("Kharadi Pune"));
    }

    #[test]
    fn test_filler_words_end_phrase() {
        let e = extractor().extract("Flat in Pune with 1200 sqft");
        assert_eq!(e.city.as_deref(), Some("Pune"));
        assert_eq!(e.area, None);
        assert_eq!(e.size_sqft, Some(1200.0));

        let e = extractor().extract("2 bhk in kharadi pune near metro");
        assert_eq!(e.location.as_deref(), Some("kharadi pune"));
        assert_eq!(e.city.as_deref(), Some("Pune"));
        assert_eq!(e.area.as_deref(), Some("kharadi"));

        let e = extractor().extract("villa in Baner, Pune with garden");
        assert_eq!(e.location.as_deref(), Some("Baner, Pune"));
        assert_eq!(e.area.as_deref(), Some("Baner"));
    }

    #[test]
    fn test_serializes_field_names() {
        let e = extractor().extract("3 BHK in Pune");
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["bedroom_count"], 3);
        assert_eq!(value["city"], "Pune");
        assert!(value["size_sqft"].is_null());
    }
}
