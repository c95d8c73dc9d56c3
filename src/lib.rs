//! Concurrent, host-scoped web crawler.
//!
//! Starting from a seed page, the crawler follows hyperlinks within a set of
//! allowed hosts, visiting each distinct URL at most once. The core is a
//! deduplicating frontier queue that detects, without races or deadlock, the
//! exact moment no worker is active and no further work can ever appear.

// Core modules
mod canonical;
mod config;
mod crawler;
mod error;
mod fetch;
mod filter;
mod frontier;
mod scrape;

// Public exports
pub use canonical::dedup_key;
pub use config::{ConfigError, CrawlConfig};
pub use crawler::{CrawlStats, Crawler, CrawlerBuilder, PageResult};
pub use error::{CrawlError, LinkParseError, ScrapeError};
pub use fetch::{Fetch, FetchError, HttpFetcher, DEFAULT_TIMEOUT};
pub use filter::HostFilter;
pub use frontier::{Frontier, Next};
pub use scrape::{extract_links, LinkScraper, ScrapeOutcome};
