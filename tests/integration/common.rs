use polite_crawler::CrawlProfile;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_AGENT: &str = "TestBot/1.0 (+https://example.com/bot)";

/// Serves `rules` at /robots.txt for both HEAD and GET
pub async fn mount_robots(server: &MockServer, rules: &str) {
    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rules))
        .mount(server)
        .await;
}

/// Serves an HTML page at `page_path`, expecting exactly `hits` requests
pub async fn mount_page(server: &MockServer, page_path: &str, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            // set_body_string would force a text/plain content type
            ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html"),
        )
        .expect(hits)
        .mount(server)
        .await;
}

/// Profile for a test server with no pacing delay
pub fn fast_profile(website: &str) -> CrawlProfile {
    CrawlProfile::new(website, USER_AGENT)
        .initial_delay(Duration::ZERO)
        .delay_step(Duration::from_millis(10))
        .max_runtime(Duration::from_secs(20))
}
