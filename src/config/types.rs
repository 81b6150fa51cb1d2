use serde::Deserialize;

/// Main configuration structure for specsweep
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Worker-pool and retry behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// Number of concurrent worker tasks
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: u32,

    /// Fetch attempts per detail page before giving up for the run
    #[serde(rename = "fetch-retries", default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Delay between listing-page transitions during discovery
    #[serde(rename = "page-delay", default = "default_page_delay")]
    pub page_delay: DelayRange,

    /// Backoff delay between failed fetch attempts
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: DelayRange,
}

/// Per-task fetch session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Referer header sent with every request; when empty, the origin of
    /// the start URL is used
    #[serde(default)]
    pub referer: String,

    /// User-agent pool; each session draws one at random
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Total request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Output location configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory under which each manufacturer gets its own subdirectory
    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: String,
}

/// An inclusive range of milliseconds to draw a random delay from
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelayRange {
    #[serde(rename = "min-ms")]
    pub min_ms: u64,
    #[serde(rename = "max-ms")]
    pub max_ms: u64,
}

fn default_worker_count() -> u32 {
    5
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_page_delay() -> DelayRange {
    DelayRange {
        min_ms: 1_000,
        max_ms: 3_000,
    }
}

fn default_retry_delay() -> DelayRange {
    DelayRange {
        min_ms: 2_000,
        max_ms: 5_000,
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.83 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.97 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/84.0.4147.125 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/86.0.4240.198 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.1 Safari/605.1.15",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            fetch_retries: default_fetch_retries(),
            page_delay: default_page_delay(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            referer: String::new(),
            user_agents: default_user_agents(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}
