//! Configuration module
//!
//! Two inputs drive a crawl:
//! - the search parameters (JSON), validated into a [`CrawlConfig`]
//! - optional crawler settings (TOML), loaded into [`Settings`]
//!
//! # Example
//!
//! ```no_run
//! use github_search_crawler::config::load_params;
//! use std::path::Path;
//!
//! let config = load_params(Path::new("resources/parameters.json")).unwrap();
//! println!("Searching {} for {:?}", config.search_type, config.keywords);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerSettings, OutputSettings, SearchType, Settings, DEFAULT_HOST,
    DEFAULT_OUTPUT_PATH, DEFAULT_PARAMS_PATH,
};

// Re-export parser functions
pub use parser::{compute_params_hash, load_params, load_params_with_hash, load_settings};

// Re-export validation entry points
pub use validation::{validate_params, validate_settings};
