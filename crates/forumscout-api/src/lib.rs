// Discourse API client - just the endpoints the export needs
pub mod discourse;
pub mod models;

// Re-export common types
pub use discourse::{DiscourseClient, DiscourseError};
pub use models::{DiscourseCategory, DiscourseUser, TopicSummary};
