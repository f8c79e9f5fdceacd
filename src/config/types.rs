use serde::Deserialize;
use std::fmt;

/// Host every search and result URL is resolved against
pub const DEFAULT_HOST: &str = "https://github.com";

/// Where the search parameters are read from when no path is given
pub const DEFAULT_PARAMS_PATH: &str = "resources/parameters.json";

/// Where the scraped items are written when no path is given
pub const DEFAULT_OUTPUT_PATH: &str = "resources/output.json";

/// Result categories supported by the GitHub search page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchType {
    Repositories,
    Issues,
    Wikis,
}

impl SearchType {
    /// All supported search types, in the order they are reported to users
    pub const ALL: [SearchType; 3] = [Self::Repositories, Self::Issues, Self::Wikis];

    /// Looks up a search type by its exact parameter name
    ///
    /// Matching is case-sensitive: `"Issues"` is accepted, `"issues"` is not.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// The name used in the parameters file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repositories => "Repositories",
            Self::Issues => "Issues",
            Self::Wikis => "Wikis",
        }
    }

    /// The value sent as the `type` query parameter
    pub fn query_value(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated search parameters for one crawl
///
/// Built only through [`crate::config::validate_params`], so `keywords` is
/// never empty and `proxies` holds no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Search keywords, in the order given
    pub keywords: Vec<String>,

    /// Which result category to search
    pub search_type: SearchType,

    /// Proxy hosts to pick from for each request
    pub proxies: Vec<String>,
}

/// Crawler settings loaded from an optional TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Enables debug logging for the whole process
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub crawler: CrawlerSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

/// Transport and extraction behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Base URL searches and result links are resolved against
    pub host: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout")]
    pub request_timeout: Option<u64>,

    /// Upper bound on concurrent detail-page fetches
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: Option<usize>,

    /// Drop items whose detail page fails instead of aborting the run
    #[serde(rename = "isolate-item-failures")]
    pub isolate_item_failures: bool,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            request_timeout: None,
            max_concurrent_fetches: None,
            isolate_item_failures: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Path to the JSON file the items are written to
    pub path: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}
