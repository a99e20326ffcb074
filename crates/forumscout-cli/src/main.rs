use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use forumscout_core::{providers::DiscourseProvider, Config, RunOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "forumscout")]
#[command(
    version,
    about = "Export Discourse categories and topics to text, CSV and JSON",
    long_about = None
)]
struct Cli {
    /// TOML config file (defaults to the user config dir if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Forum base URL, overrides DISCOURSE_URL
    #[arg(long)]
    url: Option<String>,

    /// Only topics created on or after this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    start_date: Option<NaiveDate>,

    /// Only topics created on or before this day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    end_date: Option<NaiveDate>,

    /// Only topics whose title contains this (case-insensitive)
    #[arg(long)]
    keyword: Option<String>,

    /// Look up the last poster's profile for every topic
    #[arg(long)]
    fetch_user_details: bool,

    #[arg(long)]
    fetch_topic_description: bool,

    #[arg(long)]
    fetch_last_posted_at: bool,

    /// Topics per listing page
    #[arg(long)]
    page_size: Option<u32>,

    /// Where the three export files go
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// CLI flags win over everything loaded before them
    fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.forum.base_url = url.clone();
        }
        if self.start_date.is_some() {
            config.filter.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            config.filter.end_date = self.end_date;
        }
        if let Some(keyword) = &self.keyword {
            config.filter.keyword = Some(keyword.clone());
        }
        config.enrichment.user_details |= self.fetch_user_details;
        config.enrichment.topic_description |= self.fetch_topic_description;
        config.enrichment.last_posted_at |= self.fetch_last_posted_at;
        if let Some(page_size) = self.page_size {
            config.output.page_size = page_size;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
    }
}

fn parse_cli_date(value: &str) -> Result<NaiveDate, String> {
    forumscout_core::config::parse_date("date", value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging - helps when things go sideways
    let default_filter = if cli.verbose {
        "forumscout=debug"
    } else {
        "forumscout=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing .env is fine, everything can come from the real environment
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_to(&mut config);
    config.validate()?;

    tracing::info!("Exporting from {}", config.forum.base_url);
    let provider = DiscourseProvider::new(&config.forum)?;

    match forumscout_core::run(&config, &provider).await? {
        RunOutcome::Exported { paths, topics, .. } => {
            println!(
                "Exported {} topics to {}, {} and {}",
                topics,
                paths.text.display(),
                paths.csv.display(),
                paths.json.display()
            );
            Ok(())
        }
        RunOutcome::NothingToExport { topics, categories } => anyhow::bail!(
            "Nothing exported ({} topics, {} categories fetched)",
            topics,
            categories
        ),
    }
}
