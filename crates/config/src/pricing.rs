//! Base price table
//!
//! A nested table `city → area → bedroom count → price per sqft`, loaded from
//! a JSON asset once at start and swapped atomically on explicit reload.
//! Requests take an immutable snapshot, so a reload never changes a lookup
//! that is already running.
//!
//! Keys are matched case-insensitively. The lowercase index is built when the
//! table is loaded, and all maps are ordered so that averages are computed in
//! the same order on every call.
//!
//! # Example
//!
//! ```ignore
//! let manager = PriceTableManager::from_file("config/base_prices.json", 2000.0)?;
//! let table = manager.snapshot();
//! let lookup = table.lookup("pune", Some("Kharadi"), Some(3));
//! println!("{} via {:?}", lookup.price_per_sqft, lookup.source);
//! ```

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::constants::pricing::DEFAULT_PRICE_PER_SQFT;
use crate::ConfigError;

/// Which precedence level answered a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// city + area + bedrooms
    Exact,
    /// every bedroom entry of city + area
    AreaAverage,
    /// matching bedroom entries across the city's areas
    CityBedroomAverage,
    /// every entry of the city
    CityAverage,
    /// fixed default
    Default,
}

/// Result of a price lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceLookup {
    pub price_per_sqft: f64,
    pub source: PriceSource,
}

#[derive(Debug, Clone, Default)]
struct AreaEntry {
    name: String,
    /// normalized bedroom key → price
    prices: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default)]
struct CityEntry {
    name: String,
    /// lowercase area → entry
    areas: BTreeMap<String, AreaEntry>,
}

/// Immutable price table
#[derive(Debug, Clone)]
pub struct PriceTable {
    /// lowercase city → entry
    cities: BTreeMap<String, CityEntry>,
    default_price: f64,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::empty(DEFAULT_PRICE_PER_SQFT)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// `"3"`, `"3bhk"`, `"3 BHK"` → `"3"`
fn normalize_bedroom_key(key: &str) -> String {
    let key = normalize_key(key);
    match key.strip_suffix("bhk") {
        Some(rest) => rest.trim().to_string(),
        None => key,
    }
}

/// Leaf value as a usable price
fn leaf_price(value: &serde_json::Value) -> Option<f64> {
    let price = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (price.is_finite() && price > 0.0).then_some(price)
}

fn mean<'a>(values: impl Iterator<Item = &'a f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

impl PriceTable {
    /// Table with no entries; every lookup answers `default_price`
    pub fn empty(default_price: f64) -> Self {
        Self {
            cities: BTreeMap::new(),
            default_price,
        }
    }

    /// Build from a parsed JSON document
    ///
    /// Non-object levels and non-numeric, non-finite or non-positive leaves
    /// are skipped.
    pub fn from_json_value(value: &serde_json::Value, default_price: f64) -> Result<Self, ConfigError> {
        let root = value.as_object().ok_or_else(|| {
            ConfigError::ParseError("price table root must be an object".to_string())
        })?;

        let mut cities: BTreeMap<String, CityEntry> = BTreeMap::new();
        for (city_name, areas) in root {
            let Some(areas) = areas.as_object() else {
                tracing::warn!(city = %city_name, "Skipping price table city with non-object value");
                continue;
            };

            let city = cities.entry(normalize_key(city_name)).or_insert_with(|| CityEntry {
                name: city_name.trim().to_string(),
                areas: BTreeMap::new(),
            });

            for (area_name, prices) in areas {
                let Some(prices) = prices.as_object() else {
                    continue;
                };
                let area = city
                    .areas
                    .entry(normalize_key(area_name))
                    .or_insert_with(|| AreaEntry {
                        name: area_name.trim().to_string(),
                        prices: BTreeMap::new(),
                    });
                for (bedrooms, price) in prices {
                    if let Some(price) = leaf_price(price) {
                        area.prices.insert(normalize_bedroom_key(bedrooms), price);
                    }
                }
            }
        }

        Ok(Self {
            cities,
            default_price,
        })
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>, default_price: f64) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_value(&value, default_price)
    }

    /// Price per sqft, following the documented precedence
    pub fn price_per_sqft(&self, city: &str, area: Option<&str>, bedrooms: Option<u32>) -> f64 {
        self.lookup(city, area, bedrooms).price_per_sqft
    }

    /// Price per sqft plus the precedence level that produced it
    pub fn lookup(&self, city: &str, area: Option<&str>, bedrooms: Option<u32>) -> PriceLookup {
        let fallback = PriceLookup {
            price_per_sqft: self.default_price,
            source: PriceSource::Default,
        };

        let Some(city) = self.cities.get(&normalize_key(city)) else {
            return fallback;
        };
        let bedroom_key = bedrooms.map(|b| b.to_string());

        if let Some(area) = area.and_then(|a| city.areas.get(&normalize_key(a))) {
            if let Some(price) = bedroom_key.as_ref().and_then(|k| area.prices.get(k)) {
                return PriceLookup {
                    price_per_sqft: *price,
                    source: PriceSource::Exact,
                };
            }
            if let Some(avg) = mean(area.prices.values()) {
                return PriceLookup {
                    price_per_sqft: avg,
                    source: PriceSource::AreaAverage,
                };
            }
        }

        if let Some(key) = &bedroom_key {
            if let Some(avg) = mean(city.areas.values().filter_map(|a| a.prices.get(key))) {
                return PriceLookup {
                    price_per_sqft: avg,
                    source: PriceSource::CityBedroomAverage,
                };
            }
        }

        if let Some(avg) = mean(city.areas.values().flat_map(|a| a.prices.values())) {
            return PriceLookup {
                price_per_sqft: avg,
                source: PriceSource::CityAverage,
            };
        }

        fallback
    }

    /// Canonical city names, sorted
    pub fn city_names(&self) -> Vec<String> {
        self.cities.values().map(|c| c.name.clone()).collect()
    }

    /// Number of cities
    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    /// Number of price leaves
    pub fn entry_count(&self) -> usize {
        self.cities
            .values()
            .flat_map(|c| c.areas.values())
            .map(|a| a.prices.len())
            .sum()
    }

    pub fn default_price(&self) -> f64 {
        self.default_price
    }
}

/// Holds the current price table and reloads it on request
#[derive(Clone)]
pub struct PriceTableManager {
    table: Arc<RwLock<Arc<PriceTable>>>,
    path: Option<PathBuf>,
    default_price: f64,
}

impl PriceTableManager {
    /// Manager over a fixed table (no reload source)
    pub fn with_table(table: PriceTable) -> Self {
        let default_price = table.default_price;
        Self {
            table: Arc::new(RwLock::new(Arc::new(table))),
            path: None,
            default_price,
        }
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>, default_price: f64) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let table = PriceTable::from_json_file(&path, default_price)?;
        Ok(Self {
            table: Arc::new(RwLock::new(Arc::new(table))),
            path: Some(path),
            default_price,
        })
    }

    /// Load from a JSON file, starting empty if it cannot be read
    ///
    /// A later `reload()` picks the file up once it exists.
    pub fn load_or_empty(path: impl AsRef<Path>, default_price: f64) -> Self {
        let path = path.as_ref().to_path_buf();
        let table = match PriceTable::from_json_file(&path, default_price) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Price table unavailable, every lookup will use the default price"
                );
                PriceTable::empty(default_price)
            }
        };
        Self {
            table: Arc::new(RwLock::new(Arc::new(table))),
            path: Some(path),
            default_price,
        }
    }

    /// Re-read the table from disk
    ///
    /// On failure the previous table stays in place. Returns the number of
    /// cities in the new table.
    pub fn reload(&self) -> Result<usize, ConfigError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| ConfigError::FileNotFound("No price table path set".to_string()))?;

        let table = PriceTable::from_json_file(path, self.default_price)?;
        let cities = table.city_count();
        *self.table.write() = Arc::new(table);

        tracing::info!(path = %path.display(), cities, "Price table reloaded");
        Ok(cities)
    }

    /// Immutable view of the current table
    pub fn snapshot(&self) -> Arc<PriceTable> {
        Arc::clone(&self.table.read())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
