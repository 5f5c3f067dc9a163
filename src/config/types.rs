use serde::Deserialize;

/// Main configuration structure for Site-Harvest
///
/// Every section is optional; a missing section takes its defaults so that an
/// empty file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub locale: LocaleSection,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth to follow from the start URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Minimum time between two page requests to the same origin (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Number of pages processed concurrently
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Timeout for full page fetches (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Timeout for existence probes and robots.txt fetches (seconds)
    #[serde(rename = "probe-timeout-secs", default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            politeness_delay_ms: default_politeness_delay_ms(),
            workers: default_workers(),
            page_timeout_secs: default_page_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler; also the product token matched in robots.txt
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

/// Locale negotiation configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleSection {
    /// Whether locale-priority crawling is active
    #[serde(default)]
    pub enabled: bool,

    /// Preferred locales, most preferred first
    #[serde(default)]
    pub priority: Vec<String>,

    /// Query parameter carrying the locale (e.g. "hl"); path detection when unset
    #[serde(rename = "param-name", default)]
    pub param_name: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Base directory; pages land under `<base-dir>/crawl/<host>/`
    #[serde(rename = "base-dir", default = "default_base_dir")]
    pub base_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

fn default_max_depth() -> u32 {
    5
}

fn default_politeness_delay_ms() -> u64 {
    1000
}

fn default_workers() -> u32 {
    4
}

fn default_page_timeout_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    10
}

fn default_crawler_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://github.com/site-harvest/site-harvest".to_string()
}

fn default_base_dir() -> String {
    "build/download".to_string()
}
