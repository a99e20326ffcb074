use thiserror::Error;

/// All the ways a ForumScout run can go wrong
#[derive(Error, Debug)]
pub enum Error {
    /// The forum answered, just not with a 2xx
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unparseable timestamp {value:?} on topic {topic_id}: {source}")]
    TimestampParse {
        topic_id: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// True for the "server said no" case the fetchers treat as missing data
    pub fn is_status(&self) -> bool {
        matches!(self, Error::Status { .. })
    }
}

impl From<forumscout_api::DiscourseError> for Error {
    fn from(err: forumscout_api::DiscourseError) -> Self {
        use forumscout_api::DiscourseError;

        match err {
            DiscourseError::Status { endpoint, status } => Error::Status { endpoint, status },
            DiscourseError::NetworkError(e) => Error::NetworkError(e),
            DiscourseError::ParseError(e) => Error::SerializationError(e),
            other => Error::ApiError(other.to_string()),
        }
    }
}
