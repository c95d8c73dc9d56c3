//! URL identity for deduplication.

use url::Url;

/// Derive the deduplication key for a URL.
///
/// The key is the URL with its fragment removed. The `url` crate already
/// lowercases the scheme and host at parse time, so two URLs differing only
/// by fragment or by host letter-case produce the same key. Path and query
/// are kept as-is.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use hostcrawl::dedup_key;
///
/// let a = Url::parse("https://example.com/page#top").unwrap();
/// let b = Url::parse("HTTPS://EXAMPLE.com/page").unwrap();
/// assert_eq!(dedup_key(&a), dedup_key(&b));
/// ```
pub fn dedup_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}
