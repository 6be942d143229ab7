//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use lexicrawl::config::{
    Config, CrawlerConfig, ExtractorConfig, OutputConfig, StorageBackend, UserAgentConfig,
};
use lexicrawl::crawler::{crawl, Coordinator, ExtractorMode};
use lexicrawl::seeds::Topic;
use lexicrawl::storage::{
    ArtifactKey, FileStore, LedgerStore, MemoryStore, SqliteStore, LEDGER_FILE, MAPPING_FILE,
};
use lexicrawl::url::{stable_id, CanonicalUrl};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no pacing and near-zero backoff
fn create_test_config(max_pages: u32, output_dir: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_pages,
            max_retries: 3,
            base_backoff_ms: 1,
            request_timeout_secs: 5,
            jitter_min_ms: 0,
            jitter_max_ms: 0,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            output_dir: output_dir.to_string(),
            backend: StorageBackend::Files,
            database_path: None,
        },
        extractor: ExtractorConfig::default(),
    }
}

fn topic(name: &str, seeds: &[String]) -> Vec<Topic> {
    vec![Topic {
        name: name.to_string(),
        seeds: seeds.to_vec(),
    }]
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html_page(body))
        .expect(times)
        .mount(server)
        .await;
}

fn canon(s: &str) -> CanonicalUrl {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_page_cap_and_prefix_restriction() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(
        &mock_server,
        "/shop",
        r#"<h1>Fresh apples</h1>
           <a href="/shop/item1">Item 1</a>
           <a href="/shop/item2">Item 2</a>
           <a href="https://other.test/">Elsewhere</a>
           <a href="/blog/">Blog</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/shop/item1", "<p>Green pears</p>", 1).await;
    mount_page(&mock_server, "/shop/item2", "<p>never</p>", 0).await;
    mount_page(&mock_server, "/blog", "<p>never</p>", 0).await;

    let mut coordinator =
        Coordinator::new(create_test_config(2, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator
        .run(&topic("fruit", &[format!("{}/shop/", base)]))
        .await
        .unwrap();

    assert_eq!(stats.total_visited(), 2);
    assert_eq!(stats.seeds[0].links_enqueued, 2);

    let store = coordinator.into_ledger().into_store();
    assert_eq!(
        store.visited(),
        [format!("{}/shop", base), format!("{}/shop/item1", base)]
    );
    assert!(!store.visited().iter().any(|u| u.contains("other.test")));

    assert_eq!(store.artifacts().len(), 2);
    let item1_id = stable_id(&canon(&format!("{}/shop/item1", base)));
    assert_eq!(
        store
            .get_artifact(&ArtifactKey::new("fruit", &item1_id))
            .unwrap()
            .as_deref(),
        Some("green\npears")
    );
    assert_eq!(store.mapping().len(), 2);
    assert_eq!(store.mapping()[&item1_id], format!("{}/shop/item1", base));
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    // Each page is fetched once across both runs
    mount_page(
        &mock_server,
        "/shop",
        r#"<a href="/shop/item1">1</a><a href="/shop/item1/">again</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/shop/item1", r#"<a href="/shop">back</a>"#, 1).await;

    let topics = topic("fruit", &[format!("{}/shop", base)]);

    let mut first = Coordinator::new(create_test_config(10, "unused"), MemoryStore::new()).unwrap();
    first.run(&topics).await.unwrap();
    let store = first.into_ledger().into_store();
    let mapping_after_first = store.mapping().clone();
    assert_eq!(store.visited().len(), 2);

    let mut second = Coordinator::new(create_test_config(10, "unused"), store).unwrap();
    let stats = second.run(&topics).await.unwrap();
    assert_eq!(stats.total_visited(), 0);

    let store = second.into_ledger().into_store();
    let unique: HashSet<_> = store.visited().iter().collect();
    assert_eq!(unique.len(), store.visited().len(), "ledger has duplicates");
    assert_eq!(store.visited().len(), 2);
    for (id, url) in &mapping_after_first {
        assert_eq!(store.mapping().get(id), Some(url));
    }
}

#[tokio::test]
async fn test_not_found_is_fetched_once_and_not_recorded() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(
        &mock_server,
        "/shop",
        r#"<a href="/shop/gone">gone</a><a href="/shop/ok">ok</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/shop/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/shop/ok", r#"<a href="/shop/gone">gone again</a>"#, 1).await;

    let mut coordinator =
        Coordinator::new(create_test_config(10, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator
        .run(&topic("t", &[format!("{}/shop", base)]))
        .await
        .unwrap();

    assert_eq!(stats.total_visited(), 2);
    assert_eq!(stats.total_permanent_skips(), 1);
    assert!(!coordinator
        .ledger()
        .contains(&canon(&format!("{}/shop/gone", base))));
}

#[tokio::test]
async fn test_server_error_exhausts_and_is_retried_next_run() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/flaky", mock_server.uri());

    // Three attempts per run, two runs
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(6)
        .mount(&mock_server)
        .await;

    let topics = topic("t", &[seed.clone()]);

    let mut first = Coordinator::new(create_test_config(5, "unused"), MemoryStore::new()).unwrap();
    let stats = first.run(&topics).await.unwrap();
    assert_eq!(stats.total_exhausted(), 1);
    assert_eq!(stats.total_visited(), 0);
    let store = first.into_ledger().into_store();
    assert!(store.visited().is_empty());

    let mut second = Coordinator::new(create_test_config(5, "unused"), store).unwrap();
    let stats = second.run(&topics).await.unwrap();
    assert_eq!(stats.total_exhausted(), 1);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(html_page("<p>finally</p>"))
        .with_priority(2)
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator =
        Coordinator::new(create_test_config(5, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator
        .run(&topic("t", &[format!("{}/busy", mock_server.uri())]))
        .await
        .unwrap();

    assert_eq!(stats.total_visited(), 1);
    assert_eq!(stats.total_exhausted(), 0);
}

#[tokio::test]
async fn test_robots_disallow_is_honored() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /shop/private\n"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/shop",
        r#"<a href="/shop/private/ledger">secret</a><a href="/shop/public">public</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/shop/private/ledger", "<p>secret</p>", 0).await;
    mount_page(&mock_server, "/shop/public", "<p>public</p>", 1).await;

    let mut coordinator =
        Coordinator::new(create_test_config(10, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator
        .run(&topic("t", &[format!("{}/shop", base)]))
        .await
        .unwrap();

    assert_eq!(stats.total_visited(), 2);
    assert_eq!(stats.total_disallowed(), 1);
}

#[tokio::test]
async fn test_file_backend_layout() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("out");

    mount_page(&mock_server, "/docs", r#"<p>Alpha beta</p><a href="/docs/a">a</a>"#, 1).await;
    mount_page(&mock_server, "/docs/a", "<p>Gamma alpha</p>", 1).await;

    let mut config = create_test_config(10, &output_dir.to_string_lossy());
    config.extractor.mode = ExtractorMode::TokenStream;
    let stats = crawl(config, &topic("greek", &[format!("{}/docs/", base)]))
        .await
        .unwrap();
    assert_eq!(stats.total_visited(), 2);

    let ledger = std::fs::read_to_string(output_dir.join(LEDGER_FILE)).unwrap();
    assert_eq!(ledger, format!("{0}/docs\n{0}/docs/a\n", base));

    let mapping: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(MAPPING_FILE)).unwrap())
            .unwrap();
    assert_eq!(mapping.as_object().unwrap().len(), 2);

    let id = stable_id(&canon(&format!("{}/docs/a", base)));
    let artifact =
        std::fs::read_to_string(output_dir.join("greek").join(format!("vocab_{}.txt", id))).unwrap();
    assert_eq!(artifact, "Gamma alpha");

    // Reopening sees the same state
    let store = FileStore::new(&output_dir).unwrap();
    assert_eq!(store.load_visited().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sqlite_backend() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("ledger.db");

    mount_page(&mock_server, "/wiki", "<p>Hello world</p>", 1).await;

    let mut config = create_test_config(10, &dir.path().to_string_lossy());
    config.output.backend = StorageBackend::Sqlite;
    config.output.database_path = Some(db_path.to_string_lossy().into_owned());

    let seed = format!("{}/wiki", mock_server.uri());
    crawl(config, &topic("words", &[seed.clone()])).await.unwrap();

    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(store.load_visited().unwrap(), vec![seed.clone()]);
    let id = stable_id(&canon(&seed));
    assert_eq!(
        store
            .get_artifact(&ArtifactKey::new("words", &id))
            .unwrap()
            .as_deref(),
        Some("hello\nworld")
    );
    assert_eq!(store.load_mapping().unwrap().get(&id), Some(&seed));
}

async fn mount_status(server: &MockServer, page: &str, status: u16, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_failing_url_shared_by_two_seeds_is_fetched_once_per_run() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(&mock_server, "/shop", r#"<a href="/shop/sale/broken">broken</a>"#, 1).await;
    mount_page(&mock_server, "/shop/sale", r#"<a href="/shop/sale/broken">broken</a>"#, 1).await;
    // One exhausted fetch, not one per seed
    mount_status(&mock_server, "/shop/sale/broken", 500, 3).await;

    let mut coordinator =
        Coordinator::new(create_test_config(10, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator
        .run(&topic(
            "t",
            &[format!("{}/shop", base), format!("{}/shop/sale", base)],
        ))
        .await
        .unwrap();

    assert_eq!(stats.total_visited(), 2);
    assert_eq!(stats.total_exhausted(), 1);
    assert_eq!(stats.seeds[0].links_enqueued, 1);
    assert_eq!(stats.seeds[1].links_enqueued, 0);
}

#[tokio::test]
async fn test_missing_url_shared_by_two_topics_is_fetched_once_per_run() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_page(&mock_server, "/docs", r#"<a href="/docs/gone">gone</a>"#, 1).await;
    mount_page(&mock_server, "/docs/guide", r#"<a href="/docs/gone">gone</a>"#, 1).await;
    mount_status(&mock_server, "/docs/gone", 404, 1).await;

    let topics = vec![
        Topic {
            name: "a".to_string(),
            seeds: vec![format!("{}/docs", base)],
        },
        Topic {
            name: "b".to_string(),
            seeds: vec![format!("{}/docs/guide", base)],
        },
    ];

    let mut coordinator =
        Coordinator::new(create_test_config(10, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator.run(&topics).await.unwrap();

    assert_eq!(stats.total_visited(), 2);
    assert_eq!(stats.total_permanent_skips(), 1);
    assert!(!coordinator
        .ledger()
        .contains(&canon(&format!("{}/docs/gone", base))));
}

#[tokio::test]
async fn test_new_run_on_same_coordinator_retries_failures() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/flaky", mock_server.uri());

    mount_status(&mock_server, "/flaky", 500, 6).await;

    let topics = topic("t", &[seed]);
    let mut coordinator =
        Coordinator::new(create_test_config(5, "unused"), MemoryStore::new()).unwrap();
    assert_eq!(coordinator.run(&topics).await.unwrap().total_exhausted(), 1);
    assert_eq!(coordinator.run(&topics).await.unwrap().total_exhausted(), 1);
}

#[tokio::test]
async fn test_timeout_is_retried_until_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("<p>late</p>").set_delay(Duration::from_millis(1500)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(5, "unused");
    config.crawler.request_timeout_secs = 1;
    let mut coordinator = Coordinator::new(config, MemoryStore::new()).unwrap();
    let stats = coordinator
        .run(&topic("t", &[format!("{}/slow", mock_server.uri())]))
        .await
        .unwrap();

    assert_eq!(stats.total_visited(), 0);
    assert_eq!(stats.total_exhausted(), 1);
    assert!(coordinator.ledger().visited().is_empty());
}

#[tokio::test]
async fn test_every_retry_is_paced() {
    let mock_server = MockServer::start().await;

    mount_status(&mock_server, "/flaky", 503, 3).await;

    let mut config = create_test_config(5, "unused");
    config.crawler.jitter_min_ms = 150;
    config.crawler.jitter_max_ms = 150;
    let mut coordinator = Coordinator::new(config, MemoryStore::new()).unwrap();

    let started = Instant::now();
    let stats = coordinator
        .run(&topic("t", &[format!("{}/flaky", mock_server.uri())]))
        .await
        .unwrap();

    assert_eq!(stats.total_exhausted(), 1);
    assert!(
        started.elapsed() >= Duration::from_millis(450),
        "three attempts took only {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_gone_is_a_permanent_skip() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/retired", mock_server.uri());

    mount_status(&mock_server, "/retired", 410, 1).await;

    let mut coordinator =
        Coordinator::new(create_test_config(5, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator.run(&topic("t", &[seed.clone()])).await.unwrap();

    assert_eq!(stats.total_permanent_skips(), 1);
    assert_eq!(stats.total_exhausted(), 0);
    assert!(!coordinator.ledger().contains(&canon(&seed)));
}

#[tokio::test]
async fn test_rate_limit_without_retry_after_exhausts() {
    let mock_server = MockServer::start().await;

    mount_status(&mock_server, "/busy", 429, 3).await;

    let mut coordinator =
        Coordinator::new(create_test_config(5, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator
        .run(&topic("t", &[format!("{}/busy", mock_server.uri())]))
        .await
        .unwrap();

    assert_eq!(stats.total_visited(), 0);
    assert_eq!(stats.total_exhausted(), 1);
}

#[tokio::test]
async fn test_relative_links_follow_the_redirected_url() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/shop/"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/shop/", r#"<a href="item1">Item 1</a>"#, 1).await;
    mount_page(&mock_server, "/shop/item1", "<p>pears</p>", 1).await;

    let mut coordinator =
        Coordinator::new(create_test_config(10, "unused"), MemoryStore::new()).unwrap();
    let stats = coordinator
        .run(&topic("t", &[format!("{}/shop", base)]))
        .await
        .unwrap();

    assert_eq!(stats.total_visited(), 2);
    let store = coordinator.into_ledger().into_store();
    assert_eq!(
        store.visited(),
        [format!("{}/shop", base), format!("{}/shop/item1", base)]
    );
}
