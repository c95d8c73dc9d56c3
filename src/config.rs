//! Crawl configuration and fatal pre-crawl validation.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Errors that prevent a crawl from starting at all.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// At least one allowed host is required.
    #[error("at least one allowed host is required")]
    NoAllowedHosts,

    /// An allowed host does not look like a hostname.
    #[error("host {0:?} is not a valid hostname")]
    InvalidHost(String),

    /// The seed URL could not be parsed.
    #[error("could not parse seed URL {url:?}: {source}")]
    InvalidSeedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Worker count must be greater than 0.
    #[error("worker count must be greater than 0, got {0}")]
    InvalidWorkerCount(usize),

    /// Sink channel capacity must be greater than 0.
    #[error("sink capacity must be greater than 0, got {0}")]
    InvalidSinkCapacity(usize),

    /// The default HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

// Naive hostname shape; does not cover unicode hostnames.
fn host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^([a-z0-9-]+\.)+[a-z]{2,}$").expect("static regex")
    })
}

/// Validated inputs for one crawl run: where to start and which hosts are
/// in scope.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: Url,
    /// Allowed hostnames, lowercased.
    pub allowed_hosts: Vec<String>,
}

impl CrawlConfig {
    /// Validate a seed URL and a set of allowed hosts.
    ///
    /// Fails if the host list is empty, any host fails the hostname pattern,
    /// or the seed does not parse as a URL.
    pub fn new<S: AsRef<str>>(seed: &str, hosts: &[S]) -> Result<Self, ConfigError> {
        if hosts.is_empty() {
            return Err(ConfigError::NoAllowedHosts);
        }

        let mut allowed_hosts = Vec::with_capacity(hosts.len());
        for host in hosts {
            let host = host.as_ref();
            if !host_pattern().is_match(host) {
                return Err(ConfigError::InvalidHost(host.to_string()));
            }
            allowed_hosts.push(host.to_ascii_lowercase());
        }

        let seed = Url::parse(seed).map_err(|source| ConfigError::InvalidSeedUrl {
            url: seed.to_string(),
            source,
        })?;

        Ok(Self {
            seed,
            allowed_hosts,
        })
    }
}
