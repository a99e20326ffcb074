// The whole run: categories, then topics, then the three exports
use tracing::{error, info};

use crate::{
    config::Config,
    export::{ExportPaths, Exporter},
    fetch::{fetch_categories, TopicPaginator},
    source::ForumProvider,
    Result,
};

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    Exported {
        paths: ExportPaths,
        topics: usize,
        categories: usize,
    },
    /// Topics or categories came back empty, so nothing was written
    NothingToExport { topics: usize, categories: usize },
}

/// Fetch categories and topics, then export if both came back non-empty
pub async fn run(config: &Config, provider: &dyn ForumProvider) -> Result<RunOutcome> {
    let categories = fetch_categories(provider).await?;

    let paginator = TopicPaginator::new(
        provider,
        config.filter.clone(),
        config.enrichment,
        config.output.page_size,
    );
    let topics = paginator.fetch_all().await?;

    if topics.is_empty() || categories.is_empty() {
        error!("Failed to fetch topics or categories.");
        return Ok(RunOutcome::NothingToExport {
            topics: topics.len(),
            categories: categories.len(),
        });
    }

    info!(
        "Exporting {} topics across {} categories",
        topics.len(),
        categories.len()
    );
    let paths = Exporter::new(&topics, &categories, config.enrichment)
        .write_all(&config.output.dir)?;

    Ok(RunOutcome::Exported {
        paths,
        topics: topics.len(),
        categories: categories.len(),
    })
}
