use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Label used whenever a topic's category can't be resolved
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// Wire format of `created_at` on the topic listing
pub const TOPIC_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// Categories in the order the forum listed them, plus an id index
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    categories: Vec<Category>,
    index: HashMap<u64, usize>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category. A repeated id keeps its original position but takes the newer name.
    pub fn insert(&mut self, category: Category) {
        match self.index.get(&category.id) {
            Some(&pos) => self.categories[pos].name = category.name,
            None => {
                self.index.insert(category.id, self.categories.len());
                self.categories.push(category);
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<&str> {
        self.index
            .get(&id)
            .map(|&pos| self.categories[pos].name.as_str())
    }

    /// Resolve a topic's category, never failing
    pub fn name_for(&self, category: &CategoryRef) -> &str {
        match category {
            CategoryRef::Id(id) => self.get(*id).unwrap_or(UNKNOWN_CATEGORY),
            CategoryRef::Unknown => UNKNOWN_CATEGORY,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl FromIterator<Category> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut map = Self::new();
        for category in iter {
            map.insert(category);
        }
        map
    }
}

/// A topic's category: an id, or the "Unknown" sentinel when the listing had none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryRef {
    Id(u64),
    Unknown,
}

impl From<Option<u64>> for CategoryRef {
    fn from(id: Option<u64>) -> Self {
        id.map_or(CategoryRef::Unknown, CategoryRef::Id)
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryRef::Id(id) => write!(f, "{}", id),
            CategoryRef::Unknown => write!(f, "Unknown"),
        }
    }
}

// Number when known, the string "Unknown" otherwise
impl Serialize for CategoryRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CategoryRef::Id(id) => serializer.serialize_u64(*id),
            CategoryRef::Unknown => serializer.serialize_str("Unknown"),
        }
    }
}

/// One entry of the topic listing, before filtering and enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTopic {
    pub id: u64,
    pub title: String,
    pub category_id: Option<u64>,
    /// Raw listing timestamp, parsed (or rejected) by the paginator
    pub created_at: String,
    pub posts_count: u32,
    pub views: Option<u64>,
    pub last_poster_username: Option<String>,
    pub last_poster_user_id: Option<i64>,
    pub description: Option<String>,
    pub last_posted_at: Option<String>,
}

/// Extra user data fetched for a topic's last poster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub username: String,
    /// Registration timestamp, kept verbatim from the API
    pub registered_at: String,
    pub post_count: u64,
}

/// One exported topic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicRecord {
    pub id: u64,
    pub title: String,
    pub category_id: CategoryRef,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: NaiveDateTime,
    pub posts_count: u32,
    pub views_count: u64,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_posted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<u64>,
}

impl TopicRecord {
    /// The single enrichment merge
    pub fn merge_user_details(&mut self, details: UserDetails) {
        self.username = Some(details.username);
        self.registered_at = Some(details.registered_at);
        self.post_count = Some(details.post_count);
    }
}

/// Render a timestamp the way all three outputs show it:
/// `2024-01-02 03:04:05`, with microseconds only when there are any.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

fn serialize_timestamp<S: Serializer>(
    ts: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

/// Client-side topic filters. Everything unset lets every topic through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicFilter {
    /// Inclusive lower bound, midnight of this day
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound, midnight of this day
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring of the title
    pub keyword: Option<String>,
}

impl TopicFilter {
    pub fn in_date_range(&self, created_at: &NaiveDateTime) -> bool {
        if let Some(start) = self.start_date {
            if *created_at < start.and_time(NaiveTime::MIN) {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if *created_at > end.and_time(NaiveTime::MIN) {
                return false;
            }
        }
        true
    }

    pub fn matches_keyword(&self, title: &str) -> bool {
        match &self.keyword {
            Some(keyword) => title.to_lowercase().contains(&keyword.to_lowercase()),
            None => true,
        }
    }
}

/// Which optional extras to pull in per topic. Each flag is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Fetch the last poster's profile (extra request per topic)
    #[serde(default)]
    pub user_details: bool,
    #[serde(default)]
    pub topic_description: bool,
    #[serde(default)]
    pub last_posted_at: bool,
}
