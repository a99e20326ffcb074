use crate::models::{Enrichment, TopicFilter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from an optional TOML file, then environment variables, then CLI
/// flags. Priority: CLI > Env > File > Defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub forum: ForumConfig,
    #[serde(default)]
    pub filter: TopicFilter,
    #[serde(default)]
    pub enrichment: Enrichment,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load config from `path`, or the default location if it exists, then
    /// layer the environment on top
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    // No config file? Use defaults
                    Self::default()
                }
            }
        };

        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        toml::from_str(contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> crate::Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Override fields from any variable source. Empty values count as unset.
    pub fn apply_vars<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DISCOURSE_URL") {
            self.forum.base_url = url;
        }
        if let Some(key) = get("API_KEY") {
            self.forum.api_key = key;
        }
        if let Some(username) = get("API_USERNAME") {
            self.forum.api_username = username;
        }

        if let Some(date) = get("START_DATE") {
            self.filter.start_date = Some(parse_date("START_DATE", &date)?);
        }
        if let Some(date) = get("END_DATE") {
            self.filter.end_date = Some(parse_date("END_DATE", &date)?);
        }
        if let Some(keyword) = get("KEYWORD") {
            self.filter.keyword = Some(keyword);
        }

        if let Some(flag) = get("FETCH_USER_DETAILS") {
            self.enrichment.user_details = parse_bool("FETCH_USER_DETAILS", &flag)?;
        }
        if let Some(flag) = get("FETCH_TOPIC_DESCRIPTION") {
            self.enrichment.topic_description =
                parse_bool("FETCH_TOPIC_DESCRIPTION", &flag)?;
        }
        if let Some(flag) = get("FETCH_LAST_POSTED_AT") {
            self.enrichment.last_posted_at = parse_bool("FETCH_LAST_POSTED_AT", &flag)?;
        }

        if let Some(size) = get("PAGE_SIZE") {
            self.output.page_size = size.trim().parse().map_err(|e| {
                crate::Error::ConfigError(format!("PAGE_SIZE must be a number: {}", e))
            })?;
        }
        if let Some(dir) = get("OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        Ok(())
    }

    /// Make sure we have enough to talk to the forum before any request goes out
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("DISCOURSE_URL", &self.forum.base_url),
            ("API_KEY", &self.forum.api_key),
            ("API_USERNAME", &self.forum.api_username),
        ] {
            if value.trim().is_empty() {
                return Err(crate::Error::ConfigError(format!("{} is required", name)));
            }
        }

        let url = &self.forum.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(crate::Error::ConfigError(format!(
                "DISCOURSE_URL must start with http:// or https://, got '{}'",
                url
            )));
        }

        if let (Some(start), Some(end)) = (self.filter.start_date, self.filter.end_date) {
            if start > end {
                return Err(crate::Error::ConfigError(format!(
                    "START_DATE ({}) is after END_DATE ({})",
                    start, end
                )));
            }
        }

        if self.output.page_size == 0 {
            return Err(crate::Error::ConfigError(
                "PAGE_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the default config file path
    /// Uses XDG on Linux/macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("forumscout");

        Ok(config_dir.join("config.toml"))
    }
}

/// Where the forum lives and how we authenticate
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ForumConfig {
    /// Base URL, e.g. https://meta.discourse.org
    #[serde(default)]
    pub base_url: String,

    /// Admin panel → API → New API key
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub api_username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Directory the three export files are written into
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Topics requested per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_page_size() -> u32 {
    30 // what the latest.json listing hands out anyway
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            page_size: default_page_size(),
        }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(name: &str, value: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        crate::Error::ConfigError(format!(
            "{} must be YYYY-MM-DD, got '{}': {}",
            name, value, e
        ))
    })
}

fn parse_bool(name: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(crate::Error::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            name, value
        ))),
    }
}
