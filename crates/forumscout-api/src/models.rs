use serde::{Deserialize, Serialize};

/// `GET /categories.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub category_list: CategoryList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<DiscourseCategory>,
}

/// A category as Discourse lists it. We only care about id and name,
/// serde ignores the dozens of other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscourseCategory {
    pub id: u64,
    pub name: String,
}

/// `GET /latest.json`
///
/// Both levels may be missing or `null`; either way the page reads as
/// empty, the same as the last page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestResponse {
    #[serde(default)]
    pub topic_list: Option<TopicList>,
}

impl LatestResponse {
    pub fn into_topics(self) -> Vec<TopicSummary> {
        self.topic_list
            .and_then(|list| list.topics)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicList {
    #[serde(default)]
    pub topics: Option<Vec<TopicSummary>>,
}

/// One entry of the latest-topics listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: u64,
    pub title: String,
    pub category_id: Option<u64>,
    /// Kept as the raw wire string - parsing (and failing on) it is the caller's job
    pub created_at: String,
    pub posts_count: u32,
    pub views_count: Option<u64>,
    /// Newer Discourse versions send `views` instead of `views_count`
    pub views: Option<u64>,
    pub last_poster_username: Option<String>,
    pub last_poster_user_id: Option<i64>,
    pub description: Option<String>,
    pub last_posted_at: Option<String>,
}

/// `GET /users/{id}.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: DiscourseUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscourseUser {
    pub username: String,
    /// Registration timestamp
    pub created_at: String,
    pub post_count: u64,
}
