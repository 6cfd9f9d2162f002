//! Runs driven by scripted engines instead of real page fetches

use crate::common::{fast_profile, mount_robots, USER_AGENT};
use async_trait::async_trait;
use polite_crawler::engine::{
    DiscoveredLink, EngineHooks, EngineOptions, FetchEngine, LinkVerdict, PageResponse,
};
use polite_crawler::{CrawlError, CrawlProfile, Crawler, EngineResult};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Engine whose seed fetch never completes
struct StalledEngine;

#[async_trait]
impl FetchEngine for StalledEngine {
    async fn run(&self, _seed: Url, _hooks: Arc<dyn EngineHooks>) -> EngineResult<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Engine that reports a fixed set of links concurrently and records verdicts
struct ScriptedEngine {
    links: Vec<String>,
    verdicts: Arc<parking_lot::Mutex<Vec<LinkVerdict>>>,
}

#[async_trait]
impl FetchEngine for ScriptedEngine {
    async fn run(&self, seed: Url, hooks: Arc<dyn EngineHooks>) -> EngineResult<()> {
        let response = PageResponse {
            url: seed.clone(),
            final_url: seed.clone(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: b"<html></html>".to_vec(),
            depth: 0,
        };
        hooks.on_response(&response).await;

        let mut tasks = JoinSet::new();
        for target in &self.links {
            let hooks = Arc::clone(&hooks);
            let link = DiscoveredLink {
                url: target.clone(),
                href: target.clone(),
                rel: None,
                source: seed.clone(),
                depth: 1,
            };
            tasks.spawn(async move { hooks.on_link(&link).await });
        }

        while let Some(joined) = tasks.join_next().await {
            self.verdicts.lock().push(joined?);
        }
        Ok(())
    }
}

/// Factory for a stalled engine that records whether it was ever called
fn stalled_factory(
    built: Arc<AtomicBool>,
) -> impl Fn(EngineOptions) -> EngineResult<Box<dyn FetchEngine>> + Send + Sync + 'static {
    move |_options: EngineOptions| -> EngineResult<Box<dyn FetchEngine>> {
        built.store(true, Ordering::SeqCst);
        Ok(Box::new(StalledEngine))
    }
}

#[tokio::test]
async fn test_deadline_stops_stalled_run() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    let profile = fast_profile(&mock_server.uri()).max_runtime(Duration::from_secs(1));
    let crawler = Crawler::with_engine(
        profile,
        |_options: EngineOptions| -> EngineResult<Box<dyn FetchEngine>> {
            Ok(Box::new(StalledEngine))
        },
    );

    let start = Instant::now();
    let summary = crawler.run().await.unwrap();
    let elapsed = start.elapsed();

    assert!(summary.deadline_reached);
    assert!(elapsed >= Duration::from_millis(900), "returned after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "returned after {:?}", elapsed);
}

#[tokio::test]
async fn test_policy_violation_before_engine_is_built() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: testbot\nDisallow: /").await;

    let built = Arc::new(AtomicBool::new(false));
    let crawler = Crawler::with_engine(
        fast_profile(&mock_server.uri()),
        stalled_factory(Arc::clone(&built)),
    );

    let result = crawler.run().await;
    assert!(matches!(result, Err(CrawlError::PolicyViolation { .. })));
    assert!(!built.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_engine_receives_user_agent_and_unbounded_depth() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    let seen = Arc::new(parking_lot::Mutex::new(None));
    let sink = Arc::clone(&seen);
    let mut profile = fast_profile(&mock_server.uri());
    profile.engine.max_depth = Some(1);
    profile.engine.parallelism = 7;

    let crawler = Crawler::with_engine(
        profile,
        move |options: EngineOptions| -> EngineResult<Box<dyn FetchEngine>> {
            *sink.lock() = Some(options);
            Ok(Box::new(ScriptedEngine {
                links: Vec::new(),
                verdicts: Arc::default(),
            }))
        },
    );
    crawler.run().await.unwrap();

    let options = seen.lock().clone().unwrap();
    assert_eq!(options.user_agent, USER_AGENT);
    assert_eq!(options.max_depth, None);
    assert_eq!(options.parallelism, 7);
}

#[tokio::test]
async fn test_concurrent_discovery_admits_once() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    let base = mock_server.uri();

    let mut links = vec![format!("{}/shared", base); 16];
    links.push(format!("{}/", base));
    links.push("https://b.example/x".to_string());

    let verdicts = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let recorded = Arc::clone(&verdicts);
    let crawler = Crawler::with_engine(
        fast_profile(&base),
        move |_options: EngineOptions| -> EngineResult<Box<dyn FetchEngine>> {
            Ok(Box::new(ScriptedEngine {
                links: links.clone(),
                verdicts: Arc::clone(&recorded),
            }))
        },
    );

    let summary = crawler.run().await.unwrap();

    let verdicts = verdicts.lock();
    let followed: Vec<&LinkVerdict> = verdicts
        .iter()
        .filter(|v| matches!(v, LinkVerdict::Follow(_)))
        .collect();
    assert_eq!(verdicts.len(), 18);
    assert_eq!(followed.len(), 1);
    assert_eq!(
        followed[0],
        &LinkVerdict::Follow(Url::parse(&format!("{}/shared", base)).unwrap())
    );
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.links_discovered, 18);
    assert_eq!(summary.links_admitted, 1);
}

#[tokio::test]
async fn test_deadline_covers_pacing_with_default_delay() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    // Default 2s delay: the pacing between HEAD and GET alone outlasts the run
    let profile =
        CrawlProfile::new(mock_server.uri(), USER_AGENT).max_runtime(Duration::from_secs(1));
    let built = Arc::new(AtomicBool::new(false));
    let crawler = Crawler::with_engine(profile, stalled_factory(Arc::clone(&built)));

    let start = Instant::now();
    let result = crawler.run().await;
    let elapsed = start.elapsed();

    assert!(matches!(
        result,
        Err(CrawlError::DeadlineBeforeDispatch { max_runtime }) if max_runtime == Duration::from_secs(1)
    ));
    assert!(elapsed < Duration::from_secs(2), "returned after {:?}", elapsed);
    assert!(!built.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_deadline_covers_slow_robots_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(6)))
        .mount(&mock_server)
        .await;

    let profile = fast_profile(&mock_server.uri()).max_runtime(Duration::from_secs(1));
    let built = Arc::new(AtomicBool::new(false));
    let crawler = Crawler::with_engine(profile, stalled_factory(Arc::clone(&built)));

    let start = Instant::now();
    let result = crawler.run().await;
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(CrawlError::DeadlineBeforeDispatch { .. })));
    assert!(elapsed < Duration::from_secs(3), "returned after {:?}", elapsed);
    assert!(!built.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_robots_fetched_from_origin_of_seed_with_path() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nDisallow: /private").await;

    Mock::given(method("HEAD"))
        .and(path("/wiki/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let website = format!("{}/wiki/", mock_server.uri());
    let verdicts = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let recorded = Arc::clone(&verdicts);
    let links = vec![
        format!("{}/wiki/Rust", mock_server.uri()),
        format!("{}/private/page", mock_server.uri()),
    ];
    let crawler = Crawler::with_engine(
        fast_profile(&website),
        move |_options: EngineOptions| -> EngineResult<Box<dyn FetchEngine>> {
            Ok(Box::new(ScriptedEngine {
                links: links.clone(),
                verdicts: Arc::clone(&recorded),
            }))
        },
    );

    let summary = crawler.run().await.unwrap();

    assert_eq!(summary.website, website);
    assert_eq!(summary.links_admitted, 1);
    assert!(verdicts.lock().contains(&LinkVerdict::Follow(
        Url::parse(&format!("{}/wiki/Rust", mock_server.uri())).unwrap()
    )));
}
