use crate::{
    models::{format_timestamp, CategoryMap, Enrichment, TopicRecord},
    Result,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TEXT_FILE: &str = "topics_and_categories.txt";
pub const CSV_FILE: &str = "topics_and_categories.csv";
pub const JSON_FILE: &str = "topics_and_categories.json";

/// Placeholder for optional values a topic doesn't have
const NOT_AVAILABLE: &str = "N/A";

const CSV_HEADER: &str = "Topic ID,Title,Category,Post Count,Views,User,Created At,\
                          Description,Last Posted At,User Details\n";

/// Topic ids sharing a resolved category name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub name: String,
    pub topic_ids: Vec<u64>,
}

/// Group topic ids by resolved category name, in order of first appearance.
/// Unresolvable categories all land in the "Unknown Category" bucket.
pub fn group_by_category(
    topics: &[TopicRecord],
    categories: &CategoryMap,
) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for topic in topics {
        let name = categories.name_for(&topic.category_id);
        let pos = *positions.entry(name).or_insert_with(|| {
            groups.push(CategoryGroup {
                name: name.to_string(),
                topic_ids: Vec::new(),
            });
            groups.len() - 1
        });
        groups[pos].topic_ids.push(topic.id);
    }

    groups
}

/// Where `write_all` put things
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub text: PathBuf,
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Renders one topic list three ways: text report, CSV and JSON
pub struct Exporter<'a> {
    topics: &'a [TopicRecord],
    categories: &'a CategoryMap,
    enrichment: Enrichment,
}

impl<'a> Exporter<'a> {
    pub fn new(
        topics: &'a [TopicRecord],
        categories: &'a CategoryMap,
        enrichment: Enrichment,
    ) -> Self {
        Self {
            topics,
            categories,
            enrichment,
        }
    }

    /// Write all three files into `dir` under their fixed names.
    /// Any IO failure aborts - there's nothing sensible to fall back to.
    pub fn write_all<P: AsRef<Path>>(&self, dir: P) -> Result<ExportPaths> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let paths = ExportPaths {
            text: dir.join(TEXT_FILE),
            csv: dir.join(CSV_FILE),
            json: dir.join(JSON_FILE),
        };

        fs::write(&paths.text, self.to_text())?;
        info!("Topics and categories saved to {}", paths.text.display());

        fs::write(&paths.csv, self.to_csv())?;
        info!("Topics and categories saved to {}", paths.csv.display());

        fs::write(&paths.json, self.to_json()?)?;
        info!("Topics and categories saved to {}", paths.json.display());

        Ok(paths)
    }

    /// Human-readable report: category directory, topic blocks, then the grouping
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("### Categories ###\n");
        for category in self.categories.iter() {
            output.push_str(&format!("ID: {}, Name: {}\n", category.id, category.name));
        }

        output.push_str("\n### Topics ###\n");
        for topic in self.topics {
            output.push_str(&format!(
                "ID: {}, Title: {}, Category: {}, Posts: {}, Views: {}, User: {}, Created At: {}\n",
                topic.id,
                topic.title,
                self.categories.name_for(&topic.category_id),
                topic.posts_count,
                topic.views_count,
                topic.user,
                format_timestamp(&topic.created_at),
            ));

            if let Some(desc) = &topic.description {
                output.push_str(&format!("Description: {}\n", desc));
            }
            if let Some(last_posted) = &topic.last_posted_at {
                output.push_str(&format!("Last Posted At: {}\n", last_posted));
            }
            if self.enrichment.user_details {
                output.push_str(&format!(
                    "User Details: {} | Registered At: {} | Post Count: {}\n",
                    or_na(topic.username.as_deref()),
                    or_na(topic.registered_at.as_deref()),
                    topic
                        .post_count
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                ));
            }
            output.push('\n');
        }

        output.push_str("\n### Topics Grouped by Category ###\n");
        for group in group_by_category(self.topics, self.categories) {
            let ids: Vec<String> = group.topic_ids.iter().map(|id| id.to_string()).collect();
            output.push_str(&format!("Category: {}\n", group.name));
            output.push_str(&format!("Topic IDs: {}\n", ids.join(", ")));
            output.push_str(&format!("Total Topics: {}\n\n", group.topic_ids.len()));
        }

        output
    }

    /// Flat table, one fixed column set per topic
    pub fn to_csv(&self) -> String {
        let mut output = String::from(CSV_HEADER);

        for topic in self.topics {
            let post_count = topic
                .post_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let user_details = format!(
                "Username: {}, Registered At: {}, Posts: {}",
                or_na(topic.username.as_deref()),
                or_na(topic.registered_at.as_deref()),
                post_count,
            );

            output.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{}\n",
                topic.id,
                Self::escape_csv(&topic.title),
                Self::escape_csv(self.categories.name_for(&topic.category_id)),
                topic.posts_count,
                topic.views_count,
                Self::escape_csv(&topic.user),
                format_timestamp(&topic.created_at),
                Self::escape_csv(or_na(topic.description.as_deref())),
                Self::escape_csv(or_na(topic.last_posted_at.as_deref())),
                Self::escape_csv(&user_details),
            ));
        }

        output
    }

    /// Full-fidelity dump, timestamps as strings
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.topics)?)
    }

    /// Escape CSV special characters
    fn escape_csv(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}
