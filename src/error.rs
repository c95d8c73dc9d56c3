//! Error types surfaced on a crawl's error stream.
//!
//! All of these are non-fatal: they describe the failure of one page or one
//! href and never abort the crawl itself. Fatal configuration errors live in
//! [`crate::config::ConfigError`].

use url::Url;

use crate::fetch::FetchError;

/// A page fetch that failed outright. The page yields no links, but its
/// frontier entry is still marked complete.
#[derive(Debug, thiserror::Error)]
#[error("failed to scrape {url}: {source}")]
pub struct ScrapeError {
    /// The URL whose fetch failed.
    pub url: Url,
    #[source]
    pub source: FetchError,
}

/// A malformed or unresolvable href found on an otherwise fetched page.
/// Does not affect sibling links on the same page.
#[derive(Debug, thiserror::Error)]
#[error("could not resolve href {href:?} on {page}: {source}")]
pub struct LinkParseError {
    /// The page the href was found on.
    pub page: Url,
    /// The raw href attribute value.
    pub href: String,
    #[source]
    pub source: url::ParseError,
}

/// Item type of the crawl's error sink.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    LinkParse(#[from] LinkParseError),
}
