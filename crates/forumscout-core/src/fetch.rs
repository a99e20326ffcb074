// Category fetch and the paginated topic walk
use chrono::NaiveDateTime;
use tracing::{debug, error, info};

use crate::{
    models::{
        CategoryMap, Enrichment, ListingTopic, TopicFilter, TopicRecord, TOPIC_TIMESTAMP_FORMAT,
    },
    source::ForumProvider,
    Error, Result,
};

/// Fetch every category as an id -> name map.
///
/// A non-success status is logged and comes back as an empty map; the
/// caller decides whether that sinks the run.
pub async fn fetch_categories(provider: &dyn ForumProvider) -> Result<CategoryMap> {
    match provider.categories().await {
        Ok(categories) => {
            let map: CategoryMap = categories.into_iter().collect();
            info!("Fetched {} categories", map.len());
            Ok(map)
        }
        Err(e) if e.is_status() => {
            error!("Failed to fetch categories: {}", e);
            Ok(CategoryMap::new())
        }
        Err(e) => Err(e),
    }
}

/// Walks the topic listing page by page, filtering and enriching as it goes
pub struct TopicPaginator<'a> {
    provider: &'a dyn ForumProvider,
    filter: TopicFilter,
    enrichment: Enrichment,
    page_size: u32,
}

impl<'a> TopicPaginator<'a> {
    pub fn new(
        provider: &'a dyn ForumProvider,
        filter: TopicFilter,
        enrichment: Enrichment,
        page_size: u32,
    ) -> Self {
        Self {
            provider,
            filter,
            enrichment,
            page_size,
        }
    }

    /// Fetch pages until one comes back empty or the listing returns a
    /// non-success status. Whatever was collected before that is kept.
    ///
    /// A topic with an unparseable `created_at` fails the whole walk.
    pub async fn fetch_all(&self) -> Result<Vec<TopicRecord>> {
        let mut topics = Vec::new();
        let mut page = 0u32;

        loop {
            let listing = match self.provider.topic_page(page, self.page_size).await {
                Ok(listing) => listing,
                Err(e) if e.is_status() => {
                    error!("Failed to fetch topics: {}", e);
                    break;
                }
                Err(e) => return Err(e),
            };

            if listing.is_empty() {
                debug!("Page {} is empty, done", page);
                break;
            }

            let count = listing.len();
            for summary in listing {
                if let Some(record) = self.process(summary).await? {
                    topics.push(record);
                }
            }

            info!("Fetched page {}, Topics: {}", page + 1, count);
            page += 1;
        }

        Ok(topics)
    }

    /// Filter and build one record. `Ok(None)` means the filters dropped it.
    async fn process(&self, summary: ListingTopic) -> Result<Option<TopicRecord>> {
        let created_at = parse_created_at(&summary)?;

        if !self.filter.in_date_range(&created_at) {
            return Ok(None);
        }
        if !self.filter.matches_keyword(&summary.title) {
            return Ok(None);
        }

        let mut record = TopicRecord {
            id: summary.id,
            title: summary.title,
            category_id: summary.category_id.into(),
            created_at,
            posts_count: summary.posts_count,
            views_count: summary.views.unwrap_or(0),
            user: summary
                .last_poster_username
                .unwrap_or_else(|| "Unknown".to_string()),
            description: None,
            last_posted_at: None,
            username: None,
            registered_at: None,
            post_count: None,
        };

        if self.enrichment.user_details {
            if let Some(user_id) = summary.last_poster_user_id.filter(|&id| id != 0) {
                match self.provider.user_details(user_id).await {
                    Ok(details) => record.merge_user_details(details),
                    // Not fatal - the topic just goes out without user details
                    Err(e) => {
                        error!("Failed to fetch user details for user ID {}: {}", user_id, e)
                    }
                }
            }
        }

        if self.enrichment.topic_description {
            record.description = summary.description;
        }

        if self.enrichment.last_posted_at {
            record.last_posted_at = summary.last_posted_at;
        }

        Ok(Some(record))
    }
}

fn parse_created_at(summary: &ListingTopic) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&summary.created_at, TOPIC_TIMESTAMP_FORMAT).map_err(|source| {
        Error::TimestampParse {
            topic_id: summary.id,
            value: summary.created_at.clone(),
            source,
        }
    })
}
