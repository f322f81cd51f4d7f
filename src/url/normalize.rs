use crate::{UrlError, UrlResult};
use url::Url;

/// Raw link prefixes that never lead to a crawlable page
const REJECTED_PREFIXES: &[&str] = &["mailto:", "javascript:"];

/// Resolves a raw link found on a page to an absolute, fragment-free URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Reject `mailto:` and `javascript:` links (case-insensitive)
/// 3. Drop everything from the first `#`
/// 4. Resolve the remainder against `base` (an empty remainder is `base` itself)
/// 5. Reject anything whose resolved scheme is not `http` or `https`
///
/// Scope (same-origin) filtering is not applied here; see [`crate::url::Scope`].
///
/// # Arguments
///
/// * `base` - The URL of the page the link was found on
/// * `raw` - The raw `href`/`action` value
///
/// # Returns
///
/// * `Some(Url)` - The normalized absolute URL
/// * `None` - The link is not crawlable
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webscan_crawler::url::normalize_link;
///
/// let base = Url::parse("http://a.test/").unwrap();
/// let url = normalize_link(&base, "http://a.test/page#section").unwrap();
/// assert_eq!(url.as_str(), "http://a.test/page");
/// ```
pub fn normalize_link(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();

    let lowered = raw.to_ascii_lowercase();
    if REJECTED_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return None;
    }

    let without_fragment = raw.split_once('#').map_or(raw, |(head, _)| head);

    let mut resolved = base.join(without_fragment).ok()?;
    if !is_crawlable_scheme(&resolved) {
        return None;
    }
    resolved.set_fragment(None);

    Some(resolved)
}

/// Parses and validates the crawl's start URL
///
/// The start URL must be absolute, use `http` or `https`, and have a host.
/// Any fragment is removed so the URL doubles as the first result key.
///
/// # Examples
///
/// ```
/// use webscan_crawler::url::parse_start_url;
///
/// let url = parse_start_url("http://x.test").unwrap();
/// assert_eq!(url.as_str(), "http://x.test/");
/// ```
pub fn parse_start_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_crawlable_scheme(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

fn is_crawlable_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
