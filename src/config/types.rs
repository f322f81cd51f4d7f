use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Absolute http(s) URL the crawl starts from
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Maximum link depth from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of page records stored
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Minimum time between two fetches to the same origin (seconds)
    pub delay: f64,

    /// Follow links that leave the start URL's origin
    #[serde(rename = "allow-external")]
    pub allow_external: bool,

    /// Number of concurrent crawl workers
    pub concurrency: usize,

    /// Page fetch timeout (seconds)
    #[serde(rename = "fetch-timeout")]
    pub fetch_timeout: u64,

    /// robots.txt fetch timeout (seconds)
    #[serde(rename = "robots-timeout")]
    pub robots_timeout: u64,

    /// Raise the politeness delay to the robots.txt Crawl-delay when larger
    #[serde(rename = "honor-crawl-delay")]
    pub honor_crawl_delay: bool,
}

impl CrawlerConfig {
    /// The politeness delay as a duration; invalid values collapse to zero
    pub fn delay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }

    pub fn fetch_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn robots_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.robots_timeout)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            max_depth: 2,
            max_pages: 200,
            delay: 1.0,
            allow_external: false,
            concurrency: 1,
            fetch_timeout: 15,
            robots_timeout: 5,
            honor_crawl_delay: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Complete header value; takes precedence over the fields above
    pub custom: Option<String>,
}

impl UserAgentConfig {
    /// Returns the `User-Agent` header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)` unless a custom string is set.
    pub fn header_value(&self) -> String {
        match &self.custom {
            Some(custom) => custom.clone(),
            None => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            ),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "WebScanProCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com".to_string(),
            custom: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Explicit path of the JSON results file
    #[serde(rename = "results-path")]
    pub results_path: Option<String>,

    /// Directory receiving the default results file
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Append log lines to this file instead of stderr
    #[serde(rename = "log-file")]
    pub log_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: None,
            output_dir: "outputs".to_string(),
            log_file: None,
        }
    }
}
