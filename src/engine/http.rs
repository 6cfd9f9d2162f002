//! HTTP fetch engine
//!
//! Default [`FetchEngine`]: fetches pages with reqwest, extracts anchors with
//! scraper and follows whatever the hooks tell it to, with at most
//! `parallelism` requests in flight.

use crate::engine::links::extract_links;
use crate::engine::{
    EngineFactory, EngineHooks, EngineOptions, FetchEngine, FetchFailure, LinkVerdict,
    PageRequest, PageResponse,
};
use crate::url::{extract_domain, matches_any_glob};
use crate::EngineResult;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use url::Url;

/// Builds an HTTP client identifying itself with `user_agent`
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
/// * `timeout` - Timeout of a single request
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Engine backed by reqwest and scraper
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    options: EngineOptions,
}

/// State shared by the page tasks of one engine run
struct RunContext {
    client: Client,
    options: EngineOptions,
    hooks: Arc<dyn EngineHooks>,
    permits: Semaphore,
}

impl HttpEngine {
    /// Creates an engine from `options`
    pub fn new(options: EngineOptions) -> EngineResult<Self> {
        let client = build_http_client(&options.user_agent, options.request_timeout)?;
        Ok(Self { client, options })
    }

    /// Returns the options the engine was built with
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

#[async_trait]
impl FetchEngine for HttpEngine {
    async fn run(&self, seed: Url, hooks: Arc<dyn EngineHooks>) -> EngineResult<()> {
        let ctx = Arc::new(RunContext {
            client: self.client.clone(),
            options: self.options.clone(),
            hooks,
            permits: Semaphore::new(self.options.parallelism.max(1)),
        });

        let (follow_tx, mut follow_rx) = mpsc::unbounded_channel::<PageRequest>();
        let mut tasks = JoinSet::new();

        enqueue(&ctx, &mut tasks, &follow_tx, PageRequest { url: seed, depth: 0 });

        loop {
            // Pages report followed links before they finish, so an empty task
            // set plus an empty channel means the queue has drained.
            if tasks.is_empty() {
                match follow_rx.try_recv() {
                    Ok(request) => {
                        enqueue(&ctx, &mut tasks, &follow_tx, request);
                        continue;
                    }
                    Err(_) => break,
                }
            }

            tokio::select! {
                Some(request) = follow_rx.recv() => {
                    enqueue(&ctx, &mut tasks, &follow_tx, request);
                }
                joined = tasks.join_next() => {
                    if let Some(Err(e)) = joined {
                        tracing::warn!("Page task failed: {}", e);
                    }
                }
            }
        }

        tracing::debug!("HTTP engine queue drained");
        Ok(())
    }
}

/// Spawns a page task unless the request falls outside the engine's scope
fn enqueue(
    ctx: &Arc<RunContext>,
    tasks: &mut JoinSet<()>,
    follow_tx: &mpsc::UnboundedSender<PageRequest>,
    request: PageRequest,
) {
    if let Some(max_depth) = ctx.options.max_depth {
        if request.depth > max_depth {
            tracing::debug!("Skipping {}: depth {} > {}", request.url, request.depth, max_depth);
            return;
        }
    }

    let in_scope = extract_domain(&request.url)
        .map(|host| matches_any_glob(&ctx.options.allowed_domains, &host))
        .unwrap_or(false);
    if !in_scope {
        tracing::debug!("Skipping {}: outside allowed domains", request.url);
        return;
    }

    tasks.spawn(visit(Arc::clone(ctx), request, follow_tx.clone()));
}

/// Fetches one page and reports it through the hooks
async fn visit(
    ctx: Arc<RunContext>,
    request: PageRequest,
    follow_tx: mpsc::UnboundedSender<PageRequest>,
) {
    ctx.hooks.before_request(&request).await;

    let fetched = {
        let Ok(_permit) = ctx.permits.acquire().await else {
            return;
        };
        fetch_page(&ctx.client, &request).await
    };

    let response = match fetched {
        Ok(response) => response,
        Err(failure) => {
            ctx.hooks.on_error(&failure).await;
            return;
        }
    };

    if !response.status.is_success() {
        let failure = FetchFailure {
            url: response.url.clone(),
            status: Some(response.status),
            error: format!("HTTP {}", response.status),
        };
        ctx.hooks.on_error(&failure).await;
        return;
    }

    ctx.hooks.on_response(&response).await;

    if !response.is_html() {
        return;
    }

    let links = extract_links(&response.text(), &response.final_url, request.depth + 1);
    for link in links {
        if let LinkVerdict::Follow(url) = ctx.hooks.on_link(&link).await {
            let next = PageRequest {
                url,
                depth: link.depth,
            };
            if follow_tx.send(next).is_err() {
                return;
            }
        }
    }
}

/// Issues the GET request for a page and reads its body
async fn fetch_page(client: &Client, request: &PageRequest) -> Result<PageResponse, FetchFailure> {
    let failure = |e: reqwest::Error| FetchFailure {
        url: request.url.clone(),
        status: e.status(),
        error: if e.is_timeout() {
            "Request timeout".to_string()
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else {
            e.to_string()
        },
    };

    let response = client
        .get(request.url.clone())
        .send()
        .await
        .map_err(failure)?;

    let status = response.status();
    let headers = response.headers().clone();
    let final_url = response.url().clone();
    let body = response.bytes().await.map_err(failure)?.to_vec();

    Ok(PageResponse {
        url: request.url.clone(),
        final_url,
        status,
        headers,
        body,
        depth: request.depth,
    })
}

/// Factory producing [`HttpEngine`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpEngineFactory;

impl EngineFactory for HttpEngineFactory {
    fn build(&self, options: EngineOptions) -> EngineResult<Box<dyn FetchEngine>> {
        Ok(Box::new(HttpEngine::new(options)?))
    }
}
