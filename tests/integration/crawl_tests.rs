//! Integration tests for the crawl-and-aggregate engine
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle of one website end-to-end.

use listing_scout::config::Config;
use listing_scout::crawler::{CrawlEngine, CrawlOutcome, CrawlTask};
use listing_scout::orchestrator::{EventSink, ProgressEvent};
use listing_scout::{ContactFields, TaskState};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay
fn create_test_config(max_depth: u32, max_pages: u32, check_robots: bool) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.max_pages = max_pages;
    config.crawler.check_robots = check_robots;
    config.crawler.politeness_delay_ms = 0;
    config.crawler.fetch_timeout_secs = 2;
    config.crawler.robots_timeout_secs = 2;
    config
}

/// Mounts an HTML page expected to be fetched `times` times
async fn mount_page(server: &MockServer, page: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

async fn crawl(config: &Config, seed: &str) -> CrawlOutcome {
    let engine = CrawlEngine::new(config, EventSink::disconnected(), CancellationToken::new())
        .expect("Failed to create engine");
    let task = CrawlTask::from_config(0, seed, &config.crawler);
    engine.run(&task).await
}

fn fields(emails: &str, addresses: &str, phones: &str, social_media: &str) -> ContactFields {
    ContactFields {
        emails: emails.to_string(),
        addresses: addresses.to_string(),
        phones: phones.to_string(),
        social_media: social_media.to_string(),
    }
}

#[tokio::test]
async fn test_contacts_aggregated_across_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Acme</title></head><body>
        <p>call us at (415) 555-0100</p>
        <a href="mailto:info@example.com?subject=Hello">Email us</a>
        <a href="/contact">contact</a>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/contact",
        r#"<html><body>
        <p>Email: Sales@Example.com</p>
        <p>Visit us: 123 Main Street, Springfield, IL 62701</p>
        <a href="https://www.facebook.com/acme">facebook</a>
        <a href="/">home</a>
        <script>var fake = "bot@example.com";</script>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;

    let config = create_test_config(2, 30, false);
    let outcome = crawl(&config, &base_url).await;

    assert_eq!(outcome.state, TaskState::Completed);
    assert_eq!(outcome.pages_visited, 2);
    assert_eq!(
        outcome.fields,
        fields(
            "info@example.com; sales@example.com",
            "123 Main Street, Springfield, IL 62701",
            "(415) 555-0100",
            "https://www.facebook.com/acme",
        )
    );
}

#[tokio::test]
async fn test_seed_page_scenario() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="mailto:info@example.com">Mail</a>
        <p>call us at (415) 555-0100</p></body></html>"#
            .to_string(),
        1,
    )
    .await;

    let config = create_test_config(2, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(
        outcome.fields,
        fields("info@example.com", "Not found", "(415) 555-0100", "Not found")
    );
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/a", "<html></html>".to_string(), 0).await;
    mount_page(&mock_server, "/b", "<html></html>".to_string(), 0).await;

    let config = create_test_config(0, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::Completed);
    assert_eq!(outcome.pages_visited, 1);
}

#[tokio::test]
async fn test_seed_http_500_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(2, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::Completed);
    assert_eq!(outcome.pages_visited, 1);
    assert_eq!(outcome.fields, ContactFields::not_found());
}

#[tokio::test]
async fn test_robots_blanket_disallow_skips_website() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", "<html></html>".to_string(), 0).await;

    let config = create_test_config(2, 30, true);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::Skipped);
    assert_eq!(outcome.pages_visited, 0);
    assert_eq!(
        outcome.fields,
        fields(
            "Robots.txt disallows scraping",
            "Not found",
            "Not found",
            "Not found"
        )
    );
}

#[tokio::test]
async fn test_robots_partial_disallow_is_allowed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", "<html><body>hi</body></html>".to_string(), 1).await;

    let config = create_test_config(2, 30, true);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::Completed);
    assert_eq!(outcome.pages_visited, 1);
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    let mock_server = MockServer::start().await;

    // No robots.txt mounted: the mock server answers 404
    mount_page(&mock_server, "/", "<html><body>hi</body></html>".to_string(), 1).await;

    let config = create_test_config(2, 30, true);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::Completed);
    assert_eq!(outcome.pages_visited, 1);
}

#[tokio::test]
async fn test_links_outside_host_scope_are_not_followed() {
    let mock_server = MockServer::start().await;
    let port = url::Url::parse(&mock_server.uri())
        .expect("Failed to parse base URL")
        .port()
        .expect("Mock server URL has a port");

    // `localhost` reaches the same server but is a different host
    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="http://localhost:{}/external">External</a>
            <a href="/inner">Inner</a>
            </body></html>"#,
            port
        ),
        1,
    )
    .await;
    mount_page(&mock_server, "/inner", "<html></html>".to_string(), 1).await;
    mount_page(&mock_server, "/external", "<html></html>".to_string(), 0).await;

    let config = create_test_config(2, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.pages_visited, 2);

    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording is enabled");
    let paths: Vec<&str> = requests.iter().map(|request| request.url.path()).collect();
    assert_eq!(paths, vec!["/", "/inner"]);
}

#[tokio::test]
async fn test_redirect_off_host_is_not_followed() {
    let elsewhere = MockServer::start().await;
    mount_page(
        &elsewhere,
        "/",
        "<html><body>stranger@other.test</body></html>".to_string(),
        0,
    )
    .await;

    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/go">Partners</a></body></html>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/", elsewhere.uri()).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(2, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::Completed);
    assert_eq!(outcome.pages_visited, 2);
    assert_eq!(outcome.fields.emails, "Not found");
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/en/"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/en/",
        r#"<html><body><a href="contact">Contact</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/en/contact",
        "<html><body>hello@example.com</body></html>".to_string(),
        1,
    )
    .await;

    let config = create_test_config(2, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.pages_visited, 2);
    assert_eq!(outcome.fields.emails, "hello@example.com");
}

#[tokio::test]
async fn test_failed_page_does_not_stop_traversal() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/bad">Bad</a><a href="/good">Good</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/good",
        "<html><body><p>Write to team@example.com</p></body></html>".to_string(),
        1,
    )
    .await;

    let config = create_test_config(2, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::Completed);
    assert_eq!(outcome.pages_visited, 3);
    assert_eq!(outcome.fields.emails, "team@example.com");
}

#[tokio::test]
async fn test_cancel_during_politeness_delay_keeps_partial_results() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><p>info@example.com</p><a href="/next">Next</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/next", "<html></html>".to_string(), 0).await;

    let mut config = create_test_config(2, 30, false);
    config.crawler.politeness_delay_ms = 10_000;

    let cancel = CancellationToken::new();
    let engine = CrawlEngine::new(&config, EventSink::disconnected(), cancel.clone())
        .expect("Failed to create engine");
    let task = CrawlTask::from_config(0, mock_server.uri(), &config.crawler);

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let outcome = engine.run(&task).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(outcome.state, TaskState::Cancelled);
    assert_eq!(outcome.pages_visited, 1);
    assert_eq!(outcome.fields.emails, "info@example.com");
}

#[tokio::test]
async fn test_cancel_during_slow_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>late@example.com</body></html>")
                .insert_header("content-type", "text/html")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(2, 30, false);
    config.crawler.fetch_timeout_secs = 30;

    let cancel = CancellationToken::new();
    let engine = CrawlEngine::new(&config, EventSink::disconnected(), cancel.clone())
        .expect("Failed to create engine");
    let task = CrawlTask::from_config(0, mock_server.uri(), &config.crawler);

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let outcome = engine.run(&task).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(outcome.state, TaskState::Cancelled);
    assert_eq!(outcome.pages_visited, 1);
    assert_eq!(outcome.fields, ContactFields::not_found());
}

#[tokio::test]
async fn test_page_budget_exhausted() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/p1">1</a><a href="/p2">2</a><a href="/p3">3</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/p1", "<html></html>".to_string(), 1).await;
    mount_page(&mock_server, "/p2", "<html></html>".to_string(), 0).await;
    mount_page(&mock_server, "/p3", "<html></html>".to_string(), 0).await;

    let config = create_test_config(2, 2, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::BudgetExhausted);
    assert_eq!(outcome.pages_visited, 2);
}

#[tokio::test]
async fn test_repeated_links_are_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/a#top">A again</a><a href="/a?utm_source=x">A</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/a",
        r#"<html><body><a href="/">Home</a></body></html>"#.to_string(),
        1,
    )
    .await;

    let config = create_test_config(3, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.state, TaskState::Completed);
    assert_eq!(outcome.pages_visited, 2);
}

#[tokio::test]
async fn test_binary_content_is_not_scanned() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/brochure">Brochure</a></body></html>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/brochure"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"hidden@example.com".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(2, 30, false);
    let outcome = crawl(&config, &mock_server.uri()).await;

    assert_eq!(outcome.pages_visited, 2);
    assert_eq!(outcome.fields.emails, "Not found");
}

#[tokio::test]
async fn test_page_visited_events_count_up() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/a">A</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/a", "<html></html>".to_string(), 1).await;

    let config = create_test_config(2, 30, false);
    let (events, mut receiver) = EventSink::channel();
    let engine = CrawlEngine::new(&config, events, CancellationToken::new())
        .expect("Failed to create engine");
    let task = CrawlTask::from_config(7, mock_server.uri(), &config.crawler);
    engine.run(&task).await;
    drop(engine);

    let mut counts = Vec::new();
    let mut logs = Vec::new();
    let mut finished = None;
    while let Some(event) = receiver.recv().await {
        match event {
            ProgressEvent::PageVisited {
                listing,
                count,
                max_pages,
                ..
            } => {
                assert_eq!(listing, 7);
                assert_eq!(max_pages, 30);
                counts.push(count);
            }
            ProgressEvent::Log(line) => logs.push(line),
            ProgressEvent::TaskFinished { state, .. } => finished = Some(state),
            ProgressEvent::Progress(_) => {}
        }
    }

    assert_eq!(counts, vec![1, 2]);
    assert!(logs
        .iter()
        .any(|line| line.starts_with("Visiting website page:") && line.ends_with("(1/30)")));
    assert_eq!(finished, Some(TaskState::Completed));
}
