use serde::{Deserialize, Deserializer, Serialize};

/// Desktop browser identities rotated across crawl tasks
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.101 Safari/537.36",
];

/// Main configuration structure for Listing Scout
///
/// Every section is optional in the TOML file; missing sections and keys
/// take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
}

/// Per-website crawl behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum link distance from the seed page
    pub max_depth: u32,

    /// Maximum pages fetched per website
    pub max_pages: u32,

    /// Consult robots.txt before crawling a website
    pub check_robots: bool,

    /// Number of websites crawled concurrently
    pub workers: usize,

    /// Timeout for a single page fetch (seconds)
    pub fetch_timeout_secs: u64,

    /// Timeout for the robots.txt fetch (seconds)
    pub robots_timeout_secs: u64,

    /// Pause after each processed page (milliseconds)
    pub politeness_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 30,
            check_robots: true,
            workers: 10,
            fetch_timeout_secs: 5,
            robots_timeout_secs: 5,
            politeness_delay_ms: 500,
        }
    }
}

/// Identity pool presented to websites and the discovery browser
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

/// Listing discovery (maps browser session) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// Number of listings to collect
    pub max_results: u32,

    /// Show the browser window instead of running headless
    pub non_headless: bool,

    /// Timeout for the initial search navigation (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Timeout for each element lookup (milliseconds)
    pub step_timeout_ms: u64,

    /// Attempts for retryable browser operations
    pub retry_attempts: u32,

    /// Base delay between attempts (milliseconds)
    pub retry_backoff_ms: u64,

    /// Wait after navigation and clicks for the page to settle (milliseconds)
    pub settle_delay_ms: u64,

    /// Pause between result feed scrolls (milliseconds)
    pub scroll_pause_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            non_headless: false,
            navigation_timeout_ms: 30_000,
            step_timeout_ms: 3_000,
            retry_attempts: 3,
            retry_backoff_ms: 2_000,
            settle_delay_ms: 2_000,
            scroll_pause_ms: 1_500,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the CSV results table
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "output.csv".to_string(),
        }
    }
}

/// The four user-facing tunables, persisted as a flat JSON document
///
/// Older settings files stored numbers as strings and flags as `0`/`1`;
/// both forms are accepted when loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "lenient_u32")]
    pub max_depth: u32,

    #[serde(deserialize_with = "lenient_u32")]
    pub max_pages: u32,

    #[serde(deserialize_with = "lenient_bool")]
    pub non_headless: bool,

    #[serde(deserialize_with = "lenient_bool")]
    pub check_robots: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Settings {
    /// Captures the tunables currently held by a configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            max_pages: config.crawler.max_pages,
            non_headless: config.discovery.non_headless,
            check_robots: config.crawler.check_robots,
        }
    }

    /// Overlays these tunables onto a configuration
    pub fn apply_to(&self, config: &mut Config) {
        config.crawler.max_depth = self.max_depth;
        config.crawler.max_pages = self.max_pages;
        config.discovery.non_headless = self.non_headless;
        config.crawler.check_robots = self.check_robots;
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u32),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{}'", s))),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match FlagValue::deserialize(deserializer)? {
        FlagValue::Bool(b) => Ok(b),
        FlagValue::Int(i) => Ok(i != 0),
        FlagValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a flag, got '{}'",
                other
            ))),
        },
    }
}
