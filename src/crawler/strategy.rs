//! Extraction strategies, selected by search type
//!
//! - `Repository`: follows every result link and enriches it from the
//!   repository page, one concurrent task per link
//! - `HydroClick`: takes result links straight from the search page; shared
//!   by issue and wiki searches, which render results the same way

use crate::config::SearchType;
use crate::crawler::aggregate::Aggregate;
use crate::crawler::fetcher::Transport;
use crate::crawler::parser::{
    hydro_click_links, parse_repository_extras, repository_links, SearchPage,
};
use crate::item::ResultItem;
use crate::CrawlError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use url::Url;

/// Everything a strategy needs to turn a search page into items
#[derive(Debug, Clone)]
pub struct ExtractContext {
    /// Base URL result links are resolved against
    pub host: Url,
    /// Shared transport for detail-page fetches
    pub transport: Arc<Transport>,
    /// Where finished items go
    pub aggregate: Aggregate,
    /// Bound on concurrent detail fetches; `None` means one task per link
    pub max_concurrent_fetches: Option<usize>,
    /// Log and drop items whose detail page fails instead of aborting
    pub isolate_item_failures: bool,
}

/// How results of a search type are extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorStrategy {
    Repository,
    HydroClick,
}

impl ExtractorStrategy {
    /// Picks the strategy for a search type
    pub fn route(search_type: SearchType) -> Self {
        match search_type {
            SearchType::Repositories => Self::Repository,
            SearchType::Issues | SearchType::Wikis => Self::HydroClick,
        }
    }

    /// Extracts items from a parsed search page into the context's aggregate
    pub async fn extract(self, ctx: &ExtractContext, page: &SearchPage) -> Result<(), CrawlError> {
        match self {
            Self::Repository => extract_repositories(ctx, page).await,
            Self::HydroClick => extract_hydro_click(ctx, page),
        }
    }
}

async fn extract_repositories(ctx: &ExtractContext, page: &SearchPage) -> Result<(), CrawlError> {
    let links = repository_links(page);
    tracing::info!("Found {} repository results", links.len());

    let limiter = ctx
        .max_concurrent_fetches
        .map(|permits| Arc::new(Semaphore::new(permits)));

    let mut tasks = JoinSet::new();
    for link in links {
        let item = ResultItem::from_href(&ctx.host, &link.href)?;
        tracing::info!("Processing: {}", item);

        let transport = Arc::clone(&ctx.transport);
        let aggregate = ctx.aggregate.clone();
        let limiter = limiter.clone();

        let task = async move {
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let url = item.url.clone();
            let enriched = enrich_repository(&transport, item).await?;
            tracing::debug!("Enriched: {}", enriched);
            aggregate.push(enriched);
            Ok::<_, CrawlError>(url)
        };
        tasks.spawn(task.in_current_span());
    }

    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(url) => tracing::debug!("Finished {}", url),
            Err(e) if ctx.isolate_item_failures => {
                tracing::warn!("Skipping repository result: {}", e);
            }
            Err(e) => {
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Fetches a repository page and attaches its owner and language stats
async fn enrich_repository(transport: &Transport, item: ResultItem) -> Result<ResultItem, CrawlError> {
    let url = Url::parse(&item.url)?;
    let proxy = transport.select_proxy();
    let page = transport.fetch(&url, proxy).await?;
    let extras = parse_repository_extras(&page.body, &item.url)?;
    Ok(item.with_extras(extras.into()))
}

fn extract_hydro_click(ctx: &ExtractContext, page: &SearchPage) -> Result<(), CrawlError> {
    for link in hydro_click_links(page) {
        let item = ResultItem::from_href(&ctx.host, &link.href)?;
        tracing::info!("Processing: {}", item);
        ctx.aggregate.push(item);
    }
    Ok(())
}
