// Discourse provider implementation - bridges the API client with ForumProvider
use async_trait::async_trait;
use forumscout_api::{DiscourseCategory, DiscourseClient, DiscourseUser, TopicSummary};
use tracing::debug;

use crate::{
    config::ForumConfig,
    models::{Category, ListingTopic, UserDetails},
    source::ForumProvider,
    Result,
};

/// Wrapper around DiscourseClient that implements ForumProvider
pub struct DiscourseProvider {
    client: DiscourseClient,
}

impl DiscourseProvider {
    pub fn new(forum: &ForumConfig) -> Result<Self> {
        let client = DiscourseClient::new(&forum.base_url, &forum.api_key, &forum.api_username)?;
        debug!("Discourse client ready for {}", client.base_url());
        Ok(Self { client })
    }
}

#[async_trait]
impl ForumProvider for DiscourseProvider {
    async fn categories(&self) -> Result<Vec<Category>> {
        let categories = self.client.list_categories().await?;
        Ok(categories.into_iter().map(discourse_to_category).collect())
    }

    async fn topic_page(&self, page: u32, per_page: u32) -> Result<Vec<ListingTopic>> {
        let topics = self.client.latest_topics(page, per_page).await?;
        Ok(topics.into_iter().map(discourse_to_topic).collect())
    }

    async fn user_details(&self, user_id: i64) -> Result<UserDetails> {
        let user = self.client.get_user(user_id).await?;
        Ok(discourse_to_user(user))
    }
}

fn discourse_to_category(c: DiscourseCategory) -> Category {
    Category {
        id: c.id,
        name: c.name,
    }
}

fn discourse_to_topic(t: TopicSummary) -> ListingTopic {
    ListingTopic {
        id: t.id,
        title: t.title,
        category_id: t.category_id,
        created_at: t.created_at,
        posts_count: t.posts_count,
        // views_count wins when both are sent
        views: t.views_count.or(t.views),
        last_poster_username: t.last_poster_username,
        last_poster_user_id: t.last_poster_user_id,
        description: t.description,
        last_posted_at: t.last_posted_at,
    }
}

fn discourse_to_user(u: DiscourseUser) -> UserDetails {
    UserDetails {
        username: u.username,
        registered_at: u.created_at,
        post_count: u.post_count,
    }
}
