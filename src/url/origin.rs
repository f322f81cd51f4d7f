use url::Url;

/// Returns the origin (scheme, host and port) of a URL as a cache key
///
/// Default ports are elided and the host is lowercased by the URL parser,
/// so equivalent spellings of one origin produce the same key.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webscan_crawler::url::origin_key;
///
/// let url = Url::parse("http://EXAMPLE.com:80/path").unwrap();
/// assert_eq!(origin_key(&url), "http://example.com");
///
/// let url = Url::parse("https://example.com:8443/").unwrap();
/// assert_eq!(origin_key(&url), "https://example.com:8443");
/// ```
pub fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Checks whether two URLs share scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
