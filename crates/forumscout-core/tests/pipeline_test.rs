//! End-to-end runs against a mocked Discourse instance.

use forumscout_core::config::{Config, ForumConfig, OutputConfig};
use forumscout_core::export::{CSV_FILE, JSON_FILE, TEXT_FILE};
use forumscout_core::models::Enrichment;
use forumscout_core::providers::DiscourseProvider;
use forumscout_core::{run, RunOutcome};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer, out: &TempDir, enrichment: Enrichment) -> Config {
    Config {
        forum: ForumConfig {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
            api_username: "system".to_string(),
        },
        enrichment,
        output: OutputConfig {
            dir: out.path().to_path_buf(),
            page_size: 2,
        },
        ..Config::default()
    }
}

fn topic(id: u64, title: &str, category_id: Option<u64>, user_id: i64) -> Value {
    let mut t = json!({
        "id": id,
        "title": title,
        "created_at": format!("2024-01-{:02}T12:00:00.000Z", id),
        "posts_count": id + 1,
        "views": id * 10,
        "last_poster_username": format!("user{}", user_id),
        "last_poster_user_id": user_id,
        "description": format!("Description of {}", title),
        "last_posted_at": "2024-02-01T08:00:00.000Z"
    });
    if let Some(cat) = category_id {
        t["category_id"] = json!(cat);
    }
    t
}

fn page(topics: Vec<Value>) -> Value {
    json!({ "topic_list": { "topics": topics } })
}

async fn mount_categories(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/categories.json"))
        .and(header("Api-Key", "test-key"))
        .and(header("Api-Username", "system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "category_list": {
                "categories": [
                    {"id": 1, "name": "General"},
                    {"id": 2, "name": "Announcements"}
                ]
            }
        })))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, n: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .and(query_param("page", n.to_string()))
        .and(query_param("per_page", "2"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn read(out: &TempDir, name: &str) -> String {
    std::fs::read_to_string(out.path().join(name)).expect("output file missing")
}

fn json_topics(out: &TempDir) -> Vec<Value> {
    let value: Value = serde_json::from_str(&read(out, JSON_FILE)).unwrap();
    value.as_array().unwrap().clone()
}

#[tokio::test]
async fn test_full_run_with_user_details() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_categories(&server).await;
    mount_page(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(page(vec![
            topic(1, "Welcome", Some(1), 11),
            topic(2, "Release notes", Some(2), 12),
        ])),
    )
    .await;
    mount_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(page(vec![topic(3, "Orphan", None, 13)])),
    )
    .await;
    mount_page(&server, 2, ResponseTemplate::new(200).set_body_json(page(vec![]))).await;

    for (id, name, posts) in [(11, "alice", 40), (13, "carol", 7)] {
        Mock::given(method("GET"))
            .and(path(format!("/users/{}.json", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {
                    "username": name,
                    "created_at": "2019-05-05T05:05:05.000Z",
                    "post_count": posts
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
    }
    // user 12 is gone - the topic still gets exported
    Mock::given(method("GET"))
        .and(path("/users/12.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let enrichment = Enrichment {
        user_details: true,
        ..Default::default()
    };
    let config = test_config(&server, &out, enrichment);
    let provider = DiscourseProvider::new(&config.forum).unwrap();

    match run(&config, &provider).await.unwrap() {
        RunOutcome::Exported {
            topics, categories, ..
        } => {
            assert_eq!(topics, 3);
            assert_eq!(categories, 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let topics = json_topics(&out);
    let ids: Vec<u64> = topics.iter().map(|t| t["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(topics[0]["username"], "alice");
    assert_eq!(topics[0]["post_count"], 40);
    assert_eq!(topics[0]["views_count"], 10);
    assert_eq!(topics[0]["created_at"], "2024-01-01 12:00:00");
    assert!(topics[1].get("username").is_none());
    assert_eq!(topics[2]["category_id"], "Unknown");
    assert!(topics[0].get("description").is_none());

    let text = read(&out, TEXT_FILE);
    assert!(text.contains(
        "User Details: alice | Registered At: 2019-05-05T05:05:05.000Z | Post Count: 40"
    ));
    assert!(text.contains("User Details: N/A | Registered At: N/A | Post Count: N/A"));
    assert!(text.contains("Category: Unknown Category\nTopic IDs: 3\nTotal Topics: 1"));

    let csv = read(&out, CSV_FILE);
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains("3,Orphan,Unknown Category,"));
}

#[tokio::test]
async fn test_listing_failure_keeps_earlier_pages() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_categories(&server).await;
    mount_page(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(page(vec![
            topic(1, "First", Some(1), 11),
            topic(2, "Second", Some(1), 12),
        ])),
    )
    .await;
    mount_page(&server, 1, ResponseTemplate::new(500)).await;

    let config = test_config(&server, &out, Enrichment::default());
    let provider = DiscourseProvider::new(&config.forum).unwrap();

    let outcome = run(&config, &provider).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Exported { topics: 2, .. }));

    let ids: Vec<u64> = json_topics(&out)
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_category_failure_writes_nothing() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/categories.json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_page(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(page(vec![topic(1, "First", Some(1), 11)])),
    )
    .await;
    mount_page(&server, 1, ResponseTemplate::new(200).set_body_json(page(vec![]))).await;

    let config = test_config(&server, &out, Enrichment::default());
    let provider = DiscourseProvider::new(&config.forum).unwrap();

    let outcome = run(&config, &provider).await.unwrap();
    assert!(matches!(
        outcome,
        RunOutcome::NothingToExport {
            topics: 1,
            categories: 0
        }
    ));
    assert!(!out.path().join(TEXT_FILE).exists());
    assert!(!out.path().join(CSV_FILE).exists());
    assert!(!out.path().join(JSON_FILE).exists());
}

#[tokio::test]
async fn test_description_only_enrichment_skips_user_lookups() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_categories(&server).await;
    mount_page(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(page(vec![topic(5, "Docs", Some(2), 21)])),
    )
    .await;
    mount_page(&server, 1, ResponseTemplate::new(200).set_body_json(page(vec![]))).await;
    Mock::given(method("GET"))
        .and(path("/users/21.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let enrichment = Enrichment {
        topic_description: true,
        ..Default::default()
    };
    let config = test_config(&server, &out, enrichment);
    let provider = DiscourseProvider::new(&config.forum).unwrap();

    let outcome = run(&config, &provider).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Exported { topics: 1, .. }));

    let topics = json_topics(&out);
    assert_eq!(topics[0]["description"], "Description of Docs");
    assert!(topics[0].get("username").is_none());
    assert!(topics[0].get("post_count").is_none());
    assert!(topics[0].get("last_posted_at").is_none());

    let text = read(&out, TEXT_FILE);
    assert!(text.contains("Description: Description of Docs\n"));
    assert!(!text.contains("User Details:"));
}

#[tokio::test]
async fn test_malformed_timestamp_aborts_run() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_categories(&server).await;
    let mut broken = topic(1, "Broken", Some(1), 11);
    broken["created_at"] = json!("yesterday");
    mount_page(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(page(vec![broken])),
    )
    .await;

    let config = test_config(&server, &out, Enrichment::default());
    let provider = DiscourseProvider::new(&config.forum).unwrap();

    let err = run(&config, &provider).await.unwrap_err();
    assert!(matches!(
        err,
        forumscout_core::Error::TimestampParse { topic_id: 1, .. }
    ));
    assert!(!out.path().join(JSON_FILE).exists());
}

#[tokio::test]
async fn test_null_topic_list_ends_walk_and_keeps_earlier_pages() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_categories(&server).await;
    mount_page(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(page(vec![topic(1, "First", Some(1), 11)])),
    )
    .await;
    mount_page(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(json!({ "topic_list": { "topics": null } })),
    )
    .await;

    let config = test_config(&server, &out, Enrichment::default());
    let provider = DiscourseProvider::new(&config.forum).unwrap();

    let outcome = run(&config, &provider).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Exported { topics: 1, .. }));

    let ids: Vec<u64> = json_topics(&out)
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_garbage_user_profile_still_exports_topic() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_categories(&server).await;
    mount_page(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(page(vec![topic(4, "Broken user", Some(1), 5)])),
    )
    .await;
    mount_page(&server, 1, ResponseTemplate::new(200).set_body_json(page(vec![]))).await;
    Mock::given(method("GET"))
        .and(path("/users/5.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("garbage"))
        .expect(1)
        .mount(&server)
        .await;

    let enrichment = Enrichment {
        user_details: true,
        ..Default::default()
    };
    let config = test_config(&server, &out, enrichment);
    let provider = DiscourseProvider::new(&config.forum).unwrap();

    let outcome = run(&config, &provider).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Exported { topics: 1, .. }));

    let topics = json_topics(&out);
    assert_eq!(topics[0]["id"], 4);
    assert!(topics[0].get("username").is_none());
    assert!(topics[0].get("post_count").is_none());
    assert!(read(&out, TEXT_FILE)
        .contains("User Details: N/A | Registered At: N/A | Post Count: N/A"));
}

#[tokio::test]
async fn test_garbage_listing_page_fails_the_run() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    mount_categories(&server).await;
    mount_page(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(page(vec![topic(1, "First", Some(1), 11)])),
    )
    .await;
    mount_page(&server, 1, ResponseTemplate::new(200).set_body_string("garbage")).await;

    let config = test_config(&server, &out, Enrichment::default());
    let provider = DiscourseProvider::new(&config.forum).unwrap();

    let err = run(&config, &provider).await.unwrap_err();
    assert!(matches!(err, forumscout_core::Error::SerializationError(_)));
    assert!(!out.path().join(JSON_FILE).exists());
}
