//! Crawl session - orchestration of a single search crawl
//!
//! A session moves through a fixed lifecycle:
//! 1. `new` - validated parameters and settings are bound to the session
//! 2. `setup` - the HTTP transport is acquired
//! 3. `process` - the search page is fetched, routed and extracted (once)
//! 4. `close` - the transport is released (safe to call repeatedly)
//!
//! The scraped items are then handed to the output writer.

use crate::config::{CrawlConfig, CrawlerSettings, Settings};
use crate::crawler::aggregate::Aggregate;
use crate::crawler::fetcher::Transport;
use crate::crawler::parser::parse_search_page;
use crate::crawler::strategy::{ExtractContext, ExtractorStrategy};
use crate::item::ResultItem;
use crate::output::write_items;
use crate::url::build_search_url;
use crate::{ConfigError, CrawlError};
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;
use url::Url;

/// One crawl over one search results page
pub struct CrawlSession {
    config: CrawlConfig,
    settings: CrawlerSettings,
    host: Url,
    transport: Option<Arc<Transport>>,
    aggregate: Aggregate,
    processed: bool,
    span: tracing::Span,
}

impl CrawlSession {
    /// Creates a new session; no network resources are acquired yet
    ///
    /// # Errors
    ///
    /// * `CrawlError::Config` - The configured host is not a valid URL
    pub fn new(config: CrawlConfig, settings: CrawlerSettings) -> Result<Self, CrawlError> {
        let host = Url::parse(&settings.host).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid host '{}': {}", settings.host, e))
        })?;

        let span = tracing::info_span!("crawl", search_type = %config.search_type);

        Ok(Self {
            config,
            settings,
            host,
            transport: None,
            aggregate: Aggregate::new(),
            processed: false,
            span,
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// The search page URL this session requests
    pub fn search_url(&self) -> Result<Url, CrawlError> {
        Ok(build_search_url(&self.host, &self.config)?)
    }

    /// Acquires the HTTP transport; a no-op if it is already held
    pub fn setup(&mut self) -> Result<(), CrawlError> {
        if self.transport.is_none() {
            let transport = Transport::new(&self.settings, &self.config.proxies)?;
            self.transport = Some(Arc::new(transport));
            tracing::debug!(parent: &self.span, "Transport ready");
        }
        Ok(())
    }

    /// Runs the search and extracts its results into the aggregate
    ///
    /// # Errors
    ///
    /// * `CrawlError::SessionNotReady` - `setup` was not called or the session is closed
    /// * `CrawlError::AlreadyProcessed` - The session already ran its search
    /// * `CrawlError::RequestProcess` - The search or a detail page did not answer `200 OK`
    /// * `CrawlError::Http` - A request failed at the transport level
    /// * `CrawlError::Extract` - A repository page lacked the expected elements
    pub async fn process(&mut self) -> Result<(), CrawlError> {
        if self.processed {
            return Err(CrawlError::AlreadyProcessed);
        }
        let transport = self
            .transport
            .clone()
            .ok_or(CrawlError::SessionNotReady)?;
        self.processed = true;

        let span = self.span.clone();
        self.dispatch(transport).instrument(span).await
    }

    async fn dispatch(&self, transport: Arc<Transport>) -> Result<(), CrawlError> {
        tracing::info!(
            "Searching for {} with keywords: {:?}",
            self.config.search_type,
            self.config.keywords
        );

        let url = self.search_url()?;
        let proxy = transport.select_proxy();
        let response = transport.fetch(&url, proxy).await?;
        tracing::info!("Received response: {} from {}", response.status, response.url);

        let page = parse_search_page(&response.body);
        let strategy = ExtractorStrategy::route(self.config.search_type);
        tracing::debug!("Extracting with {:?} strategy", strategy);

        let ctx = ExtractContext {
            host: self.host.clone(),
            transport,
            aggregate: self.aggregate.clone(),
            max_concurrent_fetches: self.settings.max_concurrent_fetches,
            isolate_item_failures: self.settings.isolate_item_failures,
        };
        strategy.extract(&ctx, &page).await
    }

    /// Releases the transport
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            tracing::debug!(parent: &self.span, "Transport closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// Number of items scraped so far
    pub fn item_count(&self) -> usize {
        self.aggregate.len()
    }

    /// Copies the scraped items
    pub fn items(&self) -> Vec<ResultItem> {
        self.aggregate.snapshot()
    }

    /// Consumes the session and returns the scraped items
    pub fn into_items(mut self) -> Vec<ResultItem> {
        self.close();
        self.aggregate.take()
    }
}

/// Runs a complete crawl and writes the results
///
/// This function orchestrates the entire run:
///
/// 1. Create the session and acquire the transport
/// 2. Fetch the search page and extract its results
/// 3. Close the transport (also on failure)
/// 4. Write the items to `output`, only if every step succeeded
///
/// # Returns
///
/// * `Ok(usize)` - Number of items written
/// * `Err(CrawlError)` - The run failed; nothing was written
///
/// # Example
///
/// ```no_run
/// use github_search_crawler::config::{load_params, load_settings};
/// use github_search_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_params(Path::new("resources/parameters.json"))?;
/// let settings = load_settings(None)?;
/// run_crawl(config, &settings, Path::new("resources/output.json")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: CrawlConfig,
    settings: &Settings,
    output: &Path,
) -> Result<usize, CrawlError> {
    let mut session = CrawlSession::new(config, settings.crawler.clone())?;
    session.setup()?;

    let outcome = session.process().await;
    session.close();
    outcome?;

    let items = session.into_items();
    tracing::info!(
        "Parsed {} items. Saving to {}",
        items.len(),
        output.display()
    );
    write_items(&items, output).await?;

    Ok(items.len())
}
