//! News items and feed outcome

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

/// A single news search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub link: String,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            ..Default::default()
        }
    }

    /// Lower-cased text used for keyword matching
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.snippet).to_lowercase()
    }
}

/// Outcome of a news search
///
/// Order of items follows the provider's ranking and carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum NewsFeed {
    Items(Vec<NewsItem>),
    /// No items (not configured, nothing found)
    Note(String),
    /// The search failed
    Error(String),
}

impl NewsFeed {
    /// Items, empty for note/error outcomes
    pub fn items(&self) -> &[NewsItem] {
        match self {
            NewsFeed::Items(items) => items,
            _ => &[],
        }
    }

    /// True when at least one real item is present
    pub fn is_usable(&self) -> bool {
        !self.items().is_empty()
    }
}

impl Serialize for NewsFeed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Sentinel<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            note: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        match self {
            NewsFeed::Items(items) => items.serialize(serializer),
            NewsFeed::Note(note) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(&Sentinel {
                    note: Some(note),
                    error: None,
                })?;
                seq.end()
            }
            NewsFeed::Error(error) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(&Sentinel {
                    note: None,
                    error: Some(error),
                })?;
                seq.end()
            }
        }
    }
}
