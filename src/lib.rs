//! github-search-crawler: a single-pass GitHub search scraper
//!
//! This crate queries the GitHub search page for a set of keywords, extracts
//! the matching results, optionally enriches repository results from their
//! detail pages, and writes everything to a JSON file.

pub mod config;
pub mod crawler;
pub mod item;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bad response status {status} for {url}")]
    RequestProcess { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Crawl session is not set up")]
    SessionNotReady,

    #[error("Crawl session has already processed its search")]
    AlreadyProcessed,
}

/// Errors raised while loading and validating inputs
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File {path} does not exist. Please provide a valid path")]
    NotFound { path: String },

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Invalid search type: `{given}`. Valid types are: Repositories, Issues, Wikis")]
    InvalidSearchType { given: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in settings: {0}")]
    InvalidUrl(String),
}

/// Errors raised while extracting data from a detail page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No author element found on {url}")]
    MissingOwner { url: String },

    #[error("Malformed language stat on {url}: {text:?}")]
    MalformedLanguageStat { url: String, text: String },
}

/// Errors raised while writing the output artifact
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize items: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Output directory for {path} does not exist")]
    MissingParent { path: String },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CrawlConfig, SearchType, Settings};
pub use crawler::{run_crawl, CrawlSession};
pub use item::ResultItem;
