//! Property query derived from free text

use serde::{Deserialize, Serialize};

/// A normalized property query
///
/// Built once per request from extracted entities plus defaults and not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyQuery {
    pub raw_text: String,
    pub city: String,
    #[serde(default)]
    pub area: Option<String>,
    pub bedroom_count: u32,
    pub floor_area_sqft: f64,
}

impl PropertyQuery {
    /// `"{area}, {city}"`, or the city alone
    pub fn location_label(&self) -> String {
        match &self.area {
            Some(area) => format!("{}, {}", area, self.city),
            None => self.city.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_label() {
        let mut query = PropertyQuery {
            raw_text: String::new(),
            city: "Pune".into(),
            area: Some("Kharadi".into()),
            bedroom_count: 3,
            floor_area_sqft: 1500.0,
        };
        assert_eq!(query.location_label(), "Kharadi, Pune");
        query.area = None;
        assert_eq!(query.location_label(), "Pune");
    }
}
