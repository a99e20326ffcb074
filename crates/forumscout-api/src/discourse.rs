use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    CategoriesResponse, DiscourseCategory, DiscourseUser, LatestResponse, TopicSummary,
    UserResponse,
};

const USER_AGENT: &str = "ForumScout/0.1.0";

#[derive(Error, Debug)]
pub enum DiscourseError {
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DiscourseError>;

/// Thin client over the handful of Discourse endpoints we need.
///
/// Auth is the static `Api-Key` / `Api-Username` pair, set once as default
/// headers so every request carries it.
pub struct DiscourseClient {
    client: reqwest::Client,
    base_url: String,
}

impl DiscourseClient {
    pub fn new(base_url: &str, api_key: &str, api_username: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            HeaderName::from_static("api-key"),
            HeaderValue::from_str(api_key).map_err(|_| DiscourseError::InvalidHeader("Api-Key"))?,
        );
        headers.insert(
            HeaderName::from_static("api-username"),
            HeaderValue::from_str(api_username)
                .map_err(|_| DiscourseError::InvalidHeader("Api-Username"))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every category on the forum
    pub async fn list_categories(&self) -> Result<Vec<DiscourseCategory>> {
        let url = format!("{}/categories.json", self.base_url);
        let resp: CategoriesResponse = self.get_json(&url, &[]).await?;
        Ok(resp.category_list.categories)
    }

    /// Fetch one page of the latest-topics listing. Pages are zero-based.
    pub async fn latest_topics(&self, page: u32, per_page: u32) -> Result<Vec<TopicSummary>> {
        let url = format!("{}/latest.json", self.base_url);
        let resp: LatestResponse = self
            .get_json(
                &url,
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;
        Ok(resp.into_topics())
    }

    /// Fetch a single user's public profile
    pub async fn get_user(&self, user_id: i64) -> Result<DiscourseUser> {
        let url = format!("{}/users/{}.json", self.base_url, user_id);
        let resp: UserResponse = self.get_json(&url, &[]).await?;
        Ok(resp.user)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscourseError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Read the body first so decode failures show up as ParseError, not NetworkError
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
