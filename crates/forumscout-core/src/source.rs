use crate::{
    models::{Category, ListingTopic, UserDetails},
    Result,
};

/// Trait for forum backends - keeps the paginator testable without a server
///
/// Non-success HTTP statuses must come back as `Error::Status` so callers can
/// tell "the forum said no" apart from transport or decode failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ForumProvider: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>>;

    /// One zero-based page of the topic listing, unfiltered
    async fn topic_page(&self, page: u32, per_page: u32) -> Result<Vec<ListingTopic>>;

    async fn user_details(&self, user_id: i64) -> Result<UserDetails>;
}
