//! Crawler module for the GitHub search crawl
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport with per-request proxy selection
//! - HTML parsing of search and repository pages
//! - Extraction strategies per search type
//! - Session lifecycle and overall coordination

mod aggregate;
mod fetcher;
mod parser;
mod session;
mod strategy;

pub use aggregate::Aggregate;
pub use fetcher::{build_http_client, select_proxy, FetchedPage, Transport};
pub use parser::{
    hydro_click_links, parse_repository_extras, parse_search_page, repository_links, Anchor,
    SearchPage, SearchResultLink,
};
pub use session::{run_crawl, CrawlSession};
pub use strategy::{ExtractContext, ExtractorStrategy};
