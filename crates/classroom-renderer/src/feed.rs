//! The bundled stream dataset, grouped by week.
//!
//! The dataset is a JSON object mapping week keys (the ISO date the week
//! starts on) to that week's display name and items. It is loaded once and
//! never changes afterwards.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::FeedError;
use crate::types::{StreamItem, WeeklyData};

/// Formats the exporter writes item dates in.
pub const DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%b %d, %Y",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d %B %Y",
    "%B %d, %Y",
];

static SEPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bSept\b").unwrap());

/// Parse an item date in any of [`DATE_FORMATS`]. The exporter abbreviates
/// September as `Sept`, which chrono does not know.
pub fn parse_item_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    let normalized = SEPT_RE.replace_all(date, "Sep");
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Feed {
    weeks: BTreeMap<String, WeeklyData>,
}

impl Feed {
    /// Build a feed, checking that item ids are unique across all weeks.
    pub fn from_weeks(weeks: BTreeMap<String, WeeklyData>) -> Result<Self, FeedError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (key, week) in &weeks {
            for item in &week.items {
                if let Some(first_week) = seen.insert(item.id.as_str(), key.as_str()) {
                    if first_week == key.as_str() {
                        return Err(FeedError::DuplicateItemInWeek {
                            id: item.id.clone(),
                            week: key.clone(),
                        });
                    }
                    return Err(FeedError::DuplicateItemId {
                        id: item.id.clone(),
                        first_week: first_week.to_string(),
                        second_week: key.clone(),
                    });
                }
            }
        }
        Ok(Self { weeks })
    }

    pub fn from_json(json: &str) -> Result<Self, FeedError> {
        let weeks: BTreeMap<String, WeeklyData> = serde_json::from_str(json)?;
        Self::from_weeks(weeks)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let feed = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            weeks = feed.weeks.len(),
            items = feed.item_count(),
            "loaded feed"
        );
        Ok(feed)
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.weeks.values().map(|week| week.items.len()).sum()
    }

    /// Week keys, oldest first.
    pub fn week_keys(&self) -> impl Iterator<Item = &str> {
        self.weeks.keys().map(String::as_str)
    }

    /// The week selected when nothing else is.
    pub fn first_week(&self) -> Option<&str> {
        self.week_keys().next()
    }

    pub fn week(&self, key: &str) -> Option<Week<'_>> {
        let (key, data) = self.weeks.get_key_value(key)?;
        Some(Week::new(key, data))
    }

    pub fn require_week(&self, key: &str) -> Result<Week<'_>, FeedError> {
        self.week(key).ok_or_else(|| FeedError::UnknownWeek {
            key: key.to_string(),
        })
    }

    pub fn weeks(&self) -> impl Iterator<Item = Week<'_>> {
        self.weeks.iter().map(|(key, data)| Week::new(key, data))
    }

    /// Deep-link lookup: the week an item is in, and the item.
    pub fn find_item(&self, id: &str) -> Option<(&str, &StreamItem)> {
        self.weeks.iter().find_map(|(key, week)| {
            week.items
                .iter()
                .find(|item| item.id == id)
                .map(|item| (key.as_str(), item))
        })
    }
}

/// One week, ready for display: items in date order.
#[derive(Debug, Clone)]
pub struct Week<'a> {
    pub key: &'a str,
    pub display_name: Cow<'a, str>,
    pub items: Vec<&'a StreamItem>,
}

impl<'a> Week<'a> {
    fn new(key: &'a str, data: &'a WeeklyData) -> Self {
        let display_name = if data.display_name.trim().is_empty() {
            Cow::Owned(format!("Week of {key}"))
        } else {
            Cow::Borrowed(data.display_name.as_str())
        };

        // Items with dates we can't read go last, in dataset order.
        let mut keyed: Vec<_> = data
            .items
            .iter()
            .map(|item| {
                let date = parse_item_date(&item.date);
                if date.is_none() && !item.date.trim().is_empty() {
                    tracing::warn!(id = %item.id, date = %item.date, "unparsable item date");
                }
                ((date.is_none(), date), item)
            })
            .collect();
        keyed.sort_by_key(|(sort_key, _)| *sort_key);

        Self {
            key,
            display_name,
            items: keyed.into_iter().map(|(_, item)| item).collect(),
        }
    }

    pub fn title(&self) -> &str {
        &self.display_name
    }

    pub fn assignments(&self) -> impl Iterator<Item = &'a StreamItem> + '_ {
        self.items.iter().copied().filter(|item| item.is_assignment())
    }
}
