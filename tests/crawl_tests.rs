use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::time::Duration;
use url::Url;

use hostcrawl::{
    CrawlConfig, CrawlError, CrawlStats, Crawler, Fetch, FetchError, PageResult,
};

/// In-memory site serving canned HTML bodies, counting fetches per URL.
struct StubFetcher {
    pages: HashMap<String, String>,
    broken: HashSet<String>,
    fetch_counts: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
            broken: HashSet::new(),
            fetch_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Serve a page at `url` whose body links to each URL in `links`.
    fn page(mut self, url: &str, links: &[&str]) -> Self {
        let anchors: String = links
            .iter()
            .map(|l| format!("<a href=\"{l}\">link</a>"))
            .collect();
        self.pages.insert(
            url.to_string(),
            format!("<html><body>{anchors}</body></html>"),
        );
        self
    }

    /// Serve raw HTML at `url`.
    fn raw(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// Make fetching `url` fail with a 500.
    fn broken(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetch_counts
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl Fetch for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let key = url.as_str().to_string();
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_insert(0) += 1;

        if self.broken.contains(&key) {
            return Err(FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        match self.pages.get(&key) {
            Some(body) => Ok(body.clone()),
            None => Err(FetchError::Status(StatusCode::NOT_FOUND)),
        }
    }
}

/// Run a whole crawl against the stub and collect both sink streams.
async fn run_crawl(
    fetcher: Arc<StubFetcher>,
    seed: &str,
    hosts: &[&str],
) -> (Vec<PageResult>, Vec<CrawlError>, CrawlStats) {
    let config = CrawlConfig::new(seed, hosts).unwrap();
    let builder = Crawler::builder()
        .workers(4)
        .results_capacity(1024)
        .errors_capacity(1024)
        .fetcher(fetcher);
    let ((results_tx, mut results_rx), (errors_tx, mut errors_rx)) = builder.sinks();
    let crawler = builder.build().unwrap();

    let stats = tokio::time::timeout(
        Duration::from_secs(5),
        crawler.crawl(&config, results_tx, errors_tx),
    )
    .await
    .expect("crawl should terminate");

    let mut results = Vec::new();
    while let Some(page) = results_rx.recv().await {
        results.push(page);
    }
    let mut errors = Vec::new();
    while let Some(err) = errors_rx.recv().await {
        errors.push(err);
    }

    (results, errors, stats)
}

fn result_urls(results: &[PageResult]) -> HashSet<String> {
    results.iter().map(|r| r.url.to_string()).collect()
}

#[tokio::test]
async fn test_seed_with_zero_links() {
    let fetcher = Arc::new(StubFetcher::new().page("https://example.com/", &[]));

    let (results, errors, stats) =
        run_crawl(fetcher.clone(), "https://example.com/", &["example.com"]).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url.as_str(), "https://example.com/");
    assert!(results[0].links.is_empty());
    assert!(errors.is_empty());
    assert_eq!(stats.pages_crawled, 1);
    assert_eq!(fetcher.fetch_count("https://example.com/"), 1);
}

#[tokio::test]
async fn test_seed_links_to_two_leaf_pages() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page(
                "https://example.com/",
                &["https://example.com/b", "https://example.com/c"],
            )
            .page("https://example.com/b", &[])
            .page("https://example.com/c", &[]),
    );

    let (results, errors, stats) =
        run_crawl(fetcher.clone(), "https://example.com/", &["example.com"]).await;

    assert_eq!(results.len(), 3);
    assert!(errors.is_empty());
    assert_eq!(stats.pages_crawled, 3);
    for page in ["https://example.com/", "https://example.com/b", "https://example.com/c"] {
        assert_eq!(fetcher.fetch_count(page), 1, "{page} fetched more than once");
    }
}

#[tokio::test]
async fn test_duplicate_hrefs_scraped_once() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page(
                "https://example.com/",
                &["https://example.com/b", "https://example.com/b"],
            )
            .page("https://example.com/b", &[]),
    );

    let (results, _, _) =
        run_crawl(fetcher.clone(), "https://example.com/", &["example.com"]).await;

    // Both hrefs appear in the seed's PageResult, but B is scraped once.
    assert_eq!(results.len(), 2);
    let seed = results
        .iter()
        .find(|r| r.url.as_str() == "https://example.com/")
        .unwrap();
    assert_eq!(seed.links.len(), 2);
    assert_eq!(fetcher.fetch_count("https://example.com/b"), 1);
}

#[tokio::test]
async fn test_cycle_terminates() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page("https://example.com/a", &["https://example.com/b"])
            .page("https://example.com/b", &["https://example.com/a"]),
    );

    let (results, errors, _) =
        run_crawl(fetcher.clone(), "https://example.com/a", &["example.com"]).await;

    assert_eq!(results.len(), 2);
    assert!(errors.is_empty());
    assert_eq!(fetcher.fetch_count("https://example.com/a"), 1);
    assert_eq!(fetcher.fetch_count("https://example.com/b"), 1);
}

#[tokio::test]
async fn test_rediscovery_from_two_pages_scraped_once() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page(
                "https://example.com/",
                &["https://example.com/b", "https://example.com/c"],
            )
            .page("https://example.com/b", &["https://example.com/shared"])
            .page("https://example.com/c", &["https://example.com/shared"])
            .page("https://example.com/shared", &[]),
    );

    let (results, _, _) =
        run_crawl(fetcher.clone(), "https://example.com/", &["example.com"]).await;

    assert_eq!(results.len(), 4);
    assert_eq!(fetcher.fetch_count("https://example.com/shared"), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| r.url.as_str() == "https://example.com/shared")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_off_host_links_never_fetched() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page("https://example.com/", &["https://other.com/x"])
            .page("https://other.com/x", &[]),
    );

    let (results, errors, _) =
        run_crawl(fetcher.clone(), "https://example.com/", &["example.com"]).await;

    assert!(errors.is_empty());
    assert!(!result_urls(&results).contains("https://other.com/x"));
    assert_eq!(fetcher.fetch_count("https://other.com/x"), 0);

    // The off-host link still shows up in the seed's extracted links.
    let seed = &results[0];
    assert_eq!(seed.links[0].as_str(), "https://other.com/x");
}

#[tokio::test]
async fn test_host_match_is_case_insensitive() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page("https://example.com/", &["https://EXAMPLE.com/b"])
            .page("https://example.com/b", &[]),
    );

    let (results, errors, _) =
        run_crawl(fetcher.clone(), "https://example.com/", &["EXAMPLE.COM"]).await;

    assert!(errors.is_empty());
    assert_eq!(results.len(), 2);
    // The url crate lowercases the host at parse time.
    assert_eq!(fetcher.fetch_count("https://example.com/b"), 1);
}

#[tokio::test]
async fn test_fetch_failure_reported_and_crawl_terminates() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page(
                "https://example.com/",
                &["https://example.com/b", "https://example.com/c"],
            )
            .broken("https://example.com/b")
            .page("https://example.com/c", &[]),
    );

    let (results, errors, stats) =
        run_crawl(fetcher.clone(), "https://example.com/", &["example.com"]).await;

    // B yields an error and no PageResult; the rest of the crawl proceeds.
    assert_eq!(results.len(), 2);
    assert!(!result_urls(&results).contains("https://example.com/b"));
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], CrawlError::Scrape(_)));
    assert_eq!(stats.errors_encountered, 1);
}

#[tokio::test]
async fn test_unresolvable_href_reported_siblings_kept() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .raw(
                "https://example.com/",
                "<html><body>\
                 <a href=\"https://example.com/b\">ok</a>\
                 <a href=\"http://[bad\">broken</a>\
                 <a href=\"/c\">relative</a>\
                 </body></html>",
            )
            .page("https://example.com/b", &[])
            .page("https://example.com/c", &[]),
    );

    let (results, errors, _) =
        run_crawl(fetcher.clone(), "https://example.com/", &["example.com"]).await;

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], CrawlError::LinkParse(_)));

    // The malformed href does not invalidate its siblings.
    assert_eq!(results.len(), 3);
    assert_eq!(fetcher.fetch_count("https://example.com/b"), 1);
    assert_eq!(fetcher.fetch_count("https://example.com/c"), 1);
}

#[tokio::test]
async fn test_relative_links_resolved_against_page() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page("https://example.com/docs/", &["../about", "guide"])
            .page("https://example.com/about", &[])
            .page("https://example.com/docs/guide", &[]),
    );

    let (results, errors, _) = run_crawl(
        fetcher.clone(),
        "https://example.com/docs/",
        &["example.com"],
    )
    .await;

    assert!(errors.is_empty());
    assert_eq!(results.len(), 3);
    assert_eq!(fetcher.fetch_count("https://example.com/about"), 1);
    assert_eq!(fetcher.fetch_count("https://example.com/docs/guide"), 1);
}

#[tokio::test]
async fn test_fragment_variants_fetched_once() {
    let fetcher = Arc::new(
        StubFetcher::new()
            .page(
                "https://example.com/",
                &["https://example.com/b#intro", "https://example.com/b#outro"],
            )
            .raw("https://example.com/b#intro", "<html></html>"),
    );

    let (results, _, _) =
        run_crawl(fetcher.clone(), "https://example.com/", &["example.com"]).await;

    // Only the first fragment variant is ever handed to the scraper.
    assert_eq!(results.len(), 2);
    assert_eq!(fetcher.fetch_count("https://example.com/b#intro"), 1);
    assert_eq!(fetcher.fetch_count("https://example.com/b#outro"), 0);
}
