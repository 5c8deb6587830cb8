//! Current-price estimation and the overall investment score

use serde::Serialize;

use realty_config::constants::adjustments::{AMENITY_WEIGHT, SENTIMENT_WEIGHT};
use realty_config::{PriceSource, PriceTable};
use realty_core::{MarketSignal, PropertyQuery};

/// Price estimate for one property before amenity/news adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Valuation {
    pub price_per_sqft: f64,
    pub price_source: PriceSource,
    /// price_per_sqft × floor area
    pub base_price: f64,
    pub market: MarketSignal,
    /// Base price blended with the market sample, when one exists
    pub current_price: f64,
}

impl Valuation {
    /// Look up the base price and blend in the market sample
    pub fn estimate(table: &PriceTable, query: &PropertyQuery, market: MarketSignal) -> Self {
        let lookup = table.lookup(&query.city, query.area.as_deref(), Some(query.bedroom_count));
        let base_price = lookup.price_per_sqft * query.floor_area_sqft;
        let current_price = market.blend(base_price);

        tracing::debug!(
            city = %query.city,
            area = ?query.area,
            price_per_sqft = lookup.price_per_sqft,
            source = ?lookup.source,
            base_price,
            market_sampled = market.is_sampled(),
            current_price,
            "Valuation estimated"
        );

        Self {
            price_per_sqft: lookup.price_per_sqft,
            price_source: lookup.source,
            base_price,
            market,
            current_price,
        }
    }
}

/// current × (1 + amenity×0.1 + sentiment×0.05)
pub fn adjusted_price(current_price: f64, amenity_score: f64, sentiment_score: f64) -> f64 {
    current_price * (1.0 + amenity_score * AMENITY_WEIGHT + sentiment_score * SENTIMENT_WEIGHT)
}

/// Overall investment score in [0, 1]
///
/// 40% amenity quality, 30% sentiment mapped to [0, 1], 30% five-year growth
/// saturating at +50%.
pub fn investment_score(amenity_score: f64, sentiment_score: f64, five_year_growth: f64) -> f64 {
    let sentiment = (sentiment_score + 1.0) / 2.0;
    let growth = (five_year_growth / 0.5).clamp(0.0, 1.0);
    (0.4 * amenity_score + 0.3 * sentiment + 0.3 * growth).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PriceTable {
        PriceTable::from_json_value(
            &serde_json::json!({
                "Pune": {"Kharadi": {"1": 8200, "2": 8900, "3": 9600}}
            }),
            2000.0,
        )
        .unwrap()
    }

    fn query(city: &str, area: Option<&str>) -> PropertyQuery {
        PropertyQuery {
            raw_text: String::new(),
            city: city.to_string(),
            area: area.map(String::from),
            bedroom_count: 3,
            floor_area_sqft: 1500.0,
        }
    }

    #[test]
    fn test_estimate_without_market() {
        let valuation = Valuation::estimate(&table(), &query("pune", Some("kharadi")), MarketSignal::Absent);
        assert_eq!(valuation.price_per_sqft, 9600.0);
        assert_eq!(valuation.price_source, PriceSource::Exact);
        assert_eq!(valuation.base_price, 14_400_000.0);
        assert_eq!(valuation.current_price, 14_400_000.0);
    }

    #[test]
    fn test_estimate_blends_market_sample() {
        let valuation = Valuation::estimate(
            &table(),
            &query("Pune", Some("Kharadi")),
            MarketSignal::Sampled(12_400_000.0),
        );
        assert_eq!(valuation.current_price, 13_400_000.0);
    }

    #[test]
    fn test_unknown_city_uses_default() {
        let valuation = Valuation::estimate(&table(), &query("Atlantis", None), MarketSignal::Absent);
        assert_eq!(valuation.price_source, PriceSource::Default);
        assert_eq!(valuation.base_price, 3_000_000.0);
    }

    #[test]
    fn test_adjusted_price() {
        assert_eq!(adjusted_price(1_000_000.0, 0.0, 0.0), 1_000_000.0);
        assert!((adjusted_price(1_000_000.0, 1.0, 1.0) - 1_150_000.0).abs() < 1e-6);
        assert!((adjusted_price(1_000_000.0, 0.0, -1.0) - 950_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_investment_score_bounds() {
        assert!((investment_score(0.0, 0.0, 0.0) - 0.15).abs() < 1e-12);
        assert!((investment_score(1.0, 1.0, 2.0) - 1.0).abs() < 1e-12);
        assert_eq!(investment_score(0.0, -1.0, -0.5), 0.0);

        // 1.06^5 growth
        let score = investment_score(0.5, 0.2, 0.338_225_58);
        let expected = 0.2 + 0.3 * 0.6 + 0.3 * (0.338_225_58 / 0.5);
        assert!((score - expected).abs() < 1e-9);
    }
}
