//! Host scoping for discovered links.

use url::Url;

/// Decides whether a discovered link is in-scope for the crawl.
///
/// Comparison is case-insensitive and exact on the full hostname; there is
/// no subdomain wildcarding. Links failing the filter are expected, not
/// exceptional, and are silently dropped by the caller.
pub struct HostFilter {
    hosts: Vec<String>,
}

impl HostFilter {
    /// Build a filter from allowed hostnames. Hosts are held lowercased.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether the URL's host matches one of the allowed hosts.
    /// URLs without a host (mailto:, data:, ...) are never in scope.
    pub fn in_scope(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => self.hosts.iter().any(|h| h.eq_ignore_ascii_case(host)),
            None => false,
        }
    }
}
