//! Full runs against a wiremock site with the default HTTP engine

use crate::common::{fast_profile, mount_page, mount_robots};
use polite_crawler::crawler::RejectReason;
use polite_crawler::{CrawlError, Crawler, RobotsError};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RULES: &str = "User-agent: testbot\nDisallow: /admin\n\nUser-agent: *\nAllow: /";

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, RULES).await;

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{base}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="/admin/panel">Admin</a>
            <a href="/hidden" rel="nofollow">Hidden</a>
            <a href="https://other.example/elsewhere">Elsewhere</a>
            <a href="/photo.jpg">Photo</a>
            </body></html>"#,
            base = base_url
        ),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><a href="/page2">Again</a><a href="/">Home</a></body></html>"#.to_string(),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page2",
        r#"<html><body><a href="/page1">Back</a></body></html>"#.to_string(),
        1,
    )
    .await;

    for forbidden in ["/admin/panel", "/hidden", "/photo.jpg"] {
        mount_page(&mock_server, forbidden, String::new(), 0).await;
    }

    let fetched = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&fetched);
    let observed = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let observed_sink = Arc::clone(&observed);

    let profile = fast_profile(&base_url)
        .url_filter(|url| !url.ends_with(".jpg"))
        .on_response(move |response| sink.lock().push(response.url.path().to_string()))
        .on_url(move |url| observed_sink.lock().push(url.to_string()));

    let summary = Crawler::new(profile).run().await.unwrap();

    let mut fetched = fetched.lock().clone();
    fetched.sort();
    assert_eq!(fetched, vec!["/", "/page1", "/page2"]);

    assert!(!summary.deadline_reached);
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.links_admitted, 2);

    let rejected = |reason: RejectReason| {
        summary
            .rejections
            .iter()
            .find(|(r, _)| *r == reason)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    };
    assert_eq!(rejected(RejectReason::Robots), 1);
    assert_eq!(rejected(RejectReason::NoFollow), 1);
    assert_eq!(rejected(RejectReason::CrossHost), 1);
    assert_eq!(rejected(RejectReason::Filtered), 1);
    assert!(rejected(RejectReason::AlreadyVisited) >= 3);

    // Observers saw rejected links too
    let observed = observed.lock();
    assert!(observed.iter().any(|u| u.ends_with("/hidden")));
    assert!(observed.iter().any(|u| u == "https://other.example/elsewhere"));
}

#[tokio::test]
async fn test_throttling_raises_delay() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/busy">Busy</a></body></html>"#.to_string(),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = Crawler::new(fast_profile(&mock_server.uri()))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.throttle_signals, 1);
    assert_eq!(summary.final_delay, Duration::from_millis(10));
}

#[tokio::test]
async fn test_missing_robots_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/", String::new(), 0).await;

    let result = Crawler::new(fast_profile(&mock_server.uri())).run().await;
    assert!(matches!(
        result,
        Err(CrawlError::Robots(RobotsError::Status { .. }))
    ));
}

#[tokio::test]
async fn test_disallowed_seed_aborts_run() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: testbot\nDisallow: /").await;
    mount_page(&mock_server, "/", String::new(), 0).await;

    let result = Crawler::new(fast_profile(&mock_server.uri())).run().await;
    match result {
        Err(CrawlError::PolicyViolation { url, user_agent }) => {
            assert_eq!(url, format!("{}/", mock_server.uri()));
            assert_eq!(user_agent, crate::common::USER_AGENT);
        }
        other => panic!("expected policy violation, got {:?}", other.map(|_| ())),
    }
}
