use crate::common::{mount_robots, USER_AGENT};
use polite_crawler::{RateLimiter, RobotsPolicy};
use polite_crawler::RobotsError;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_sends_user_agent_on_both_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: testbot\nDisallow: /private"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let limiter = RateLimiter::new(Duration::ZERO);
    let website = format!("{}/", mock_server.uri());

    let policy = RobotsPolicy::fetch(&client, &website, USER_AGENT, &limiter)
        .await
        .unwrap();

    let base = mock_server.uri();
    assert!(!policy.allows(&format!("{}/private/x", base), USER_AGENT));
    assert!(policy.allows(&format!("{}/public", base), USER_AGENT));
}

#[tokio::test]
async fn test_head_failure_aborts_without_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let limiter = RateLimiter::new(Duration::ZERO);

    let result = RobotsPolicy::fetch(&client, &mock_server.uri(), USER_AGENT, &limiter).await;
    match result {
        Err(RobotsError::Status { method, status, .. }) => {
            assert_eq!(method, "HEAD");
            assert_eq!(status.as_u16(), 404);
        }
        other => panic!("expected HEAD status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_failure_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let limiter = RateLimiter::new(Duration::ZERO);

    let result = RobotsPolicy::fetch(&client, &mock_server.uri(), USER_AGENT, &limiter).await;
    assert!(matches!(
        result,
        Err(RobotsError::Status { method: "GET", .. })
    ));
}

#[tokio::test]
async fn test_invalid_utf8_body_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0xfd]))
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::new();
    let limiter = RateLimiter::new(Duration::ZERO);

    let result = RobotsPolicy::fetch(&client, &mock_server.uri(), USER_AGENT, &limiter).await;
    assert!(matches!(result, Err(RobotsError::Body(_))));
}

#[tokio::test]
async fn test_fetch_reads_crawl_delay() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nCrawl-delay: 4\nDisallow: /tmp").await;

    let client = reqwest::Client::new();
    let limiter = RateLimiter::new(Duration::ZERO);
    let policy = RobotsPolicy::fetch(&client, &mock_server.uri(), USER_AGENT, &limiter)
        .await
        .unwrap();

    assert_eq!(policy.crawl_delay(USER_AGENT), Some(Duration::from_secs(4)));
}
