//! Amenity inventory types
//!
//! An inventory maps a category label (`schools`, `hospitals`, ...) to the
//! places found for it. It is produced by a places collaborator and consumed
//! read-only by the amenity scorer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single place returned by the places provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl PlaceRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vicinity: None,
            rating: None,
            lat: None,
            lng: None,
        }
    }
}

/// Places found for one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmenityCategory {
    pub count: usize,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub places: Vec<PlaceRecord>,
}

impl AmenityCategory {
    /// Build a category entry from place records
    pub fn from_places(places: Vec<PlaceRecord>) -> Self {
        Self {
            count: places.len(),
            names: places.iter().map(|p| p.name.clone()).collect(),
            places,
        }
    }

    /// Category entry carrying only a count
    pub fn with_count(count: usize) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }
}

/// Category label → places
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmenityInventory(BTreeMap<String, AmenityCategory>);

impl AmenityInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, category: AmenityCategory) {
        self.0.insert(label.into(), category);
    }

    /// Builder-style insert
    pub fn with(mut self, label: impl Into<String>, category: AmenityCategory) -> Self {
        self.insert(label, category);
        self
    }

    pub fn get(&self, label: &str) -> Option<&AmenityCategory> {
        self.0.get(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AmenityCategory)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of places across every category
    pub fn total_count(&self) -> usize {
        self.0.values().map(|c| c.count).sum()
    }
}

impl FromIterator<(String, AmenityCategory)> for AmenityInventory {
    fn from_iter<I: IntoIterator<Item = (String, AmenityCategory)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of an amenity lookup
///
/// Serializes to the inventory map itself, or to `{"note": ...}` /
/// `{"error": ...}` when no inventory could be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmenityReport {
    Note { note: String },
    Error { error: String },
    Inventory(AmenityInventory),
}

impl AmenityReport {
    pub fn note(message: impl Into<String>) -> Self {
        AmenityReport::Note {
            note: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        AmenityReport::Error {
            error: message.into(),
        }
    }

    /// The inventory, if one was produced
    pub fn inventory(&self) -> Option<&AmenityInventory> {
        match self {
            AmenityReport::Inventory(inv) => Some(inv),
            _ => None,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, AmenityReport::Note { .. })
    }
}
