// Core logic - fetch, filter, enrich, export
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod source;

pub use config::Config;
pub use error::Error;
pub use export::{ExportPaths, Exporter};
pub use fetch::{fetch_categories, TopicPaginator};
pub use pipeline::{run, RunOutcome};
pub use source::ForumProvider;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
