//! Fetch a page and extract its outbound links.

use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{LinkParseError, ScrapeError};
use crate::fetch::Fetch;

/// Everything extracted from one successfully fetched page.
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// Absolute URLs in document order. Duplicates within the page are kept;
    /// deduplication is the frontier's job.
    pub links: Vec<Url>,
    /// Hrefs that could not be resolved against the page URL. These never
    /// abort extraction of the remaining links.
    pub parse_errors: Vec<LinkParseError>,
}

/// Fetches pages through a [`Fetch`] transport and extracts hyperlinks.
pub struct LinkScraper {
    fetcher: Arc<dyn Fetch>,
}

impl LinkScraper {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    /// Fetch `url` once and extract every hyperlink reference.
    ///
    /// A failed fetch is fatal to this page only and yields no links.
    pub async fn scrape(&self, url: &Url) -> Result<ScrapeOutcome, ScrapeError> {
        let body = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| ScrapeError {
                url: url.clone(),
                source,
            })?;
        Ok(extract_links(url, &body))
    }
}

/// Extract every `a[href]` from `body`, resolving each against `page`.
pub fn extract_links(page: &Url, body: &str) -> ScrapeOutcome {
    let document = Html::parse_document(body);
    let anchors = Selector::parse("a[href]").expect("static selector");

    let mut links = Vec::new();
    let mut parse_errors = Vec::new();

    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        match page.join(href) {
            Ok(link) => links.push(link),
            Err(source) => parse_errors.push(LinkParseError {
                page: page.clone(),
                href: href.to_string(),
                source,
            }),
        }
    }

    ScrapeOutcome {
        links,
        parse_errors,
    }
}
