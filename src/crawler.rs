//! Crawl driver: a fixed pool of symmetric workers over the frontier.
//!
//! Each worker loops dequeue → scrape → filter + enqueue children → report,
//! and marks its frontier entry complete only after every child enqueue has
//! been counted. Results and errors flow to bounded channels supplied by the
//! caller; a slow consumer stalls workers rather than dropping data.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hostcrawl::{CrawlConfig, Crawler, HttpFetcher};
//! use tokio::sync::mpsc;
//!
//! let config = CrawlConfig::new("https://example.com", &["example.com"])?;
//! let crawler = Crawler::builder().workers(8).build()?;
//!
//! let (results_tx, mut results_rx) = mpsc::channel(64);
//! let (errors_tx, mut errors_rx) = mpsc::channel(8);
//!
//! tokio::spawn(async move {
//!     while let Some(page) = results_rx.recv().await {
//!         println!("{}: {} links", page.url, page.links.len());
//!     }
//! });
//!
//! let stats = crawler.crawl(&config, results_tx, errors_tx).await;
//! println!("crawled {} pages", stats.pages_crawled);
//! ```

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ConfigError, CrawlConfig};
use crate::error::CrawlError;
use crate::fetch::{Fetch, HttpFetcher};
use crate::filter::HostFilter;
use crate::frontier::{Frontier, Next};
use crate::scrape::LinkScraper;

const DEFAULT_WORKERS: usize = 8;
const DEFAULT_RESULTS_CAPACITY: usize = 64;
const DEFAULT_ERRORS_CAPACITY: usize = 8;

/// One successfully scraped page: its URL and the links found on it, in
/// document order, before any host filtering or deduplication.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub url: Url,
    pub links: Vec<Url>,
}

/// Counters accumulated over one crawl run.
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Pages scraped successfully.
    pub pages_crawled: usize,
    /// In-scope links accepted by the frontier (first sighting only).
    pub links_discovered: usize,
    /// Scrape and link-parse errors forwarded to the error sink.
    pub errors_encountered: usize,
}

/// Shared atomic counters behind [`CrawlStats`]. Relaxed ordering is enough:
/// the counters are informational and never drive control flow.
#[derive(Default)]
struct StatsTracker {
    pages_crawled: AtomicUsize,
    links_discovered: AtomicUsize,
    errors_encountered: AtomicUsize,
}

impl StatsTracker {
    fn page_crawled(&self) {
        self.pages_crawled.fetch_add(1, Ordering::Relaxed);
    }

    fn link_discovered(&self) {
        self.links_discovered.fetch_add(1, Ordering::Relaxed);
    }

    fn error_encountered(&self) {
        self.errors_encountered.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CrawlStats {
        CrawlStats {
            pages_crawled: self.pages_crawled.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            errors_encountered: self.errors_encountered.load(Ordering::Relaxed),
        }
    }
}

/// Web crawler coordinating a frontier, a scraper, and a worker pool.
pub struct Crawler {
    workers: usize,
    fetcher: Arc<dyn Fetch>,
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl Crawler {
    /// Create a crawler builder for custom configuration.
    pub fn builder() -> CrawlerBuilder {
        CrawlerBuilder::new()
    }

    /// Run one crawl to completion.
    ///
    /// Seeds the frontier, starts the worker pool, and returns once the
    /// frontier has drained and every worker has exited. The supplied sink
    /// senders (and the clones held by workers) are all dropped by then, so
    /// the receiving ends observe end-of-stream.
    ///
    /// Per-page failures are forwarded to `errors` and never abort the
    /// crawl; the only paths to termination are a drained frontier here or
    /// a configuration error before this method is called.
    pub async fn crawl(
        &self,
        config: &CrawlConfig,
        results: mpsc::Sender<PageResult>,
        errors: mpsc::Sender<CrawlError>,
    ) -> CrawlStats {
        let frontier = Arc::new(Frontier::new());
        let scraper = Arc::new(LinkScraper::new(self.fetcher.clone()));
        let filter = Arc::new(HostFilter::new(&config.allowed_hosts));
        let stats = Arc::new(StatsTracker::default());

        frontier.enqueue(config.seed.clone());

        let mut pool = JoinSet::new();
        for worker in 0..self.workers {
            pool.spawn(worker_loop(
                worker,
                frontier.clone(),
                scraper.clone(),
                filter.clone(),
                results.clone(),
                errors.clone(),
                stats.clone(),
            ));
        }
        drop(results);
        drop(errors);

        frontier.wait().await;
        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                warn!("worker task failed: {e}");
            }
        }

        stats.snapshot()
    }
}

/// One consumer loop bound to the frontier's pull interface.
///
/// Workers are symmetric and hold no private state; all shared state lives
/// in the frontier. Every dequeued URL is marked complete exactly once, on
/// every path through the loop body, after any enqueues its processing
/// triggered.
async fn worker_loop(
    worker: usize,
    frontier: Arc<Frontier>,
    scraper: Arc<LinkScraper>,
    filter: Arc<HostFilter>,
    results: mpsc::Sender<PageResult>,
    errors: mpsc::Sender<CrawlError>,
    stats: Arc<StatsTracker>,
) {
    loop {
        let url = match frontier.next().await {
            Next::Item(url) => url,
            Next::Drained => break,
        };
        debug!(worker, %url, "scraping");

        match scraper.scrape(&url).await {
            Ok(outcome) => {
                for parse_error in outcome.parse_errors {
                    stats.error_encountered();
                    forward_error(&errors, parse_error.into()).await;
                }

                for link in &outcome.links {
                    if filter.in_scope(link) && frontier.enqueue(link.clone()) {
                        stats.link_discovered();
                    }
                }

                stats.page_crawled();
                let page = PageResult {
                    url,
                    links: outcome.links,
                };
                if results.send(page).await.is_err() {
                    warn!(worker, "result sink closed, dropping page result");
                }
            }
            Err(scrape_error) => {
                stats.error_encountered();
                forward_error(&errors, scrape_error.into()).await;
            }
        }

        frontier.task_done();
    }
    debug!(worker, "frontier drained, worker exiting");
}

async fn forward_error(errors: &mpsc::Sender<CrawlError>, error: CrawlError) {
    if errors.send(error).await.is_err() {
        warn!("error sink closed, dropping crawl error");
    }
}

/// Builder for configuring a [`Crawler`].
pub struct CrawlerBuilder {
    workers: usize,
    results_capacity: usize,
    errors_capacity: usize,
    fetcher: Option<Arc<dyn Fetch>>,
}

impl CrawlerBuilder {
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            results_capacity: DEFAULT_RESULTS_CAPACITY,
            errors_capacity: DEFAULT_ERRORS_CAPACITY,
            fetcher: None,
        }
    }

    /// Set the number of concurrent workers (default: 8).
    ///
    /// The pool runs exactly this many consumer loops.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the bound of the result sink created by [`CrawlerBuilder::sinks`]
    /// (default: 64).
    pub fn results_capacity(mut self, capacity: usize) -> Self {
        self.results_capacity = capacity;
        self
    }

    /// Set the bound of the error sink created by [`CrawlerBuilder::sinks`]
    /// (default: 8).
    pub fn errors_capacity(mut self, capacity: usize) -> Self {
        self.errors_capacity = capacity;
        self
    }

    /// Use a custom [`Fetch`] transport instead of the default HTTP client.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Create the bounded result and error channels at the configured
    /// capacities.
    pub fn sinks(
        &self,
    ) -> (
        (mpsc::Sender<PageResult>, mpsc::Receiver<PageResult>),
        (mpsc::Sender<CrawlError>, mpsc::Receiver<CrawlError>),
    ) {
        (
            mpsc::channel(self.results_capacity),
            mpsc::channel(self.errors_capacity),
        )
    }

    /// Build the crawler, validating the configured values.
    pub fn build(self) -> Result<Crawler, ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(0));
        }
        if self.results_capacity == 0 || self.errors_capacity == 0 {
            return Err(ConfigError::InvalidSinkCapacity(0));
        }
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()?),
        };
        Ok(Crawler {
            workers: self.workers,
            fetcher,
        })
    }
}

impl Default for CrawlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
