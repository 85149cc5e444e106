//! Integration tests for a full run
//!
//! Discovery is served from a static listing set; websites are wiremock
//! servers. Each test drives the orchestrator end-to-end through the crawl
//! stage and, where relevant, the CSV output.

use listing_scout::config::Config;
use listing_scout::discovery::StaticListings;
use listing_scout::output::{write_listings_csv, CSV_HEADER};
use listing_scout::{ContactFields, EventSink, Listing, Orchestrator, ProgressEvent, TaskState};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.politeness_delay_ms = 0;
    config.crawler.check_robots = false;
    config.crawler.fetch_timeout_secs = 2;
    config.crawler.workers = 2;
    config
}

/// Starts a website whose home page shows one email address
async fn website_with_email(email: &str, expected_fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    "<html><body><p>Write to {}</p></body></html>",
                    email
                ))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_fetches)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_results_merge_in_listing_order() {
    let first = website_with_email("first@example.com", 1).await;
    let second = website_with_email("second@example.com", 1).await;
    let third = website_with_email("third@example.com", 1).await;

    let mut source = StaticListings::new(vec![
        Listing::new("First", first.uri()),
        Listing::new("No Site", ""),
        Listing::new("Second", second.uri()),
        Listing::new("Third", third.uri()),
    ]);

    let orchestrator = Orchestrator::new(
        create_test_config(),
        EventSink::disconnected(),
        CancellationToken::new(),
    );
    let report = orchestrator
        .run(&mut source, "bakeries in Springfield")
        .await
        .expect("Run should succeed");

    let emails: Vec<&str> = report
        .listings
        .iter()
        .map(|listing| {
            listing
                .contacts
                .as_ref()
                .map(|c| c.emails.as_str())
                .unwrap_or("")
        })
        .collect();
    assert_eq!(
        emails,
        vec![
            "first@example.com",
            "No website",
            "second@example.com",
            "third@example.com"
        ]
    );

    assert_eq!(report.statistics.listings, 4);
    assert_eq!(report.statistics.without_website, 1);
    assert_eq!(report.statistics.tasks(TaskState::Completed), 3);
    assert_eq!(report.statistics.listings_with_email, 3);
}

#[tokio::test]
async fn test_shared_website_is_crawled_independently() {
    let shared = website_with_email("hello@example.com", 2).await;

    let orchestrator = Orchestrator::new(
        create_test_config(),
        EventSink::disconnected(),
        CancellationToken::new(),
    );
    let report = orchestrator
        .enrich(vec![
            Listing::new("Branch A", shared.uri()),
            Listing::new("Branch B", shared.uri()),
        ])
        .await
        .expect("Run should succeed");

    for listing in &report.listings {
        let contacts = listing.contacts.as_ref().expect("Listing was enriched");
        assert_eq!(contacts.emails, "hello@example.com");
    }
    assert_eq!(report.statistics.pages_visited, 2);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let site = website_with_email("a@example.com", 1).await;

    let (events, mut receiver) = EventSink::channel();
    let orchestrator = Orchestrator::new(create_test_config(), events, CancellationToken::new());
    let mut source = StaticListings::new(vec![
        Listing::new("A", site.uri()),
        Listing::new("B", ""),
    ]);

    orchestrator
        .run(&mut source, "query")
        .await
        .expect("Run should succeed");
    drop(orchestrator);

    let mut progress = Vec::new();
    let mut finished = Vec::new();
    while let Some(event) = receiver.recv().await {
        match event {
            ProgressEvent::Progress(p) => progress.push(p),
            ProgressEvent::TaskFinished { listing, state, .. } => finished.push((listing, state)),
            _ => {}
        }
    }

    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(progress.first(), Some(&0.0));
    assert_eq!(progress.last(), Some(&100.0));
    assert_eq!(finished, vec![(0, TaskState::Completed)]);
}

#[tokio::test]
async fn test_run_writes_csv_table() {
    let site = website_with_email("office@example.com", 1).await;

    let mut listing = Listing::new("Acme, Inc", site.uri());
    listing.phone = "+1 415-555-0100".to_string();
    let mut source = StaticListings::new(vec![listing, Listing::new("Nowhere", "")]);

    let orchestrator = Orchestrator::new(
        create_test_config(),
        EventSink::disconnected(),
        CancellationToken::new(),
    );
    let report = orchestrator
        .run(&mut source, "query")
        .await
        .expect("Run should succeed");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let csv_path = dir.path().join("results.csv");
    write_listings_csv(&csv_path, &report.listings).expect("Failed to write CSV");

    let mut reader = csv::Reader::from_path(&csv_path).expect("Failed to open CSV");
    let header: Vec<String> = reader
        .headers()
        .expect("CSV has a header")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(header, CSV_HEADER.to_vec());

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("Rows are well-formed");
    assert_eq!(rows.len(), 2);

    assert_eq!(&rows[0][0], "Acme, Inc");
    assert_eq!(&rows[0][2], "+1 415-555-0100");
    assert_eq!(&rows[0][5], "");
    assert_eq!(&rows[0][6], "office@example.com");
    assert_eq!(&rows[0][7], "Not found");

    let no_site = ContactFields::no_website();
    assert_eq!(&rows[1][0], "Nowhere");
    assert_eq!(&rows[1][6], no_site.emails.as_str());
    assert_eq!(&rows[1][9], "Not found");
}

#[tokio::test]
async fn test_max_results_limits_discovery() {
    let mut config = create_test_config();
    config.discovery.max_results = 1;

    let orchestrator = Orchestrator::new(config, EventSink::disconnected(), CancellationToken::new());
    let mut source = StaticListings::new(vec![Listing::new("A", ""), Listing::new("B", "")]);

    let report = orchestrator
        .run(&mut source, "query")
        .await
        .expect("Run should succeed");

    assert_eq!(report.listings.len(), 1);
    assert_eq!(report.listings[0].name, "A");
}
