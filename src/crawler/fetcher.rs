//! HTTP transport for the crawler
//!
//! This module handles all HTTP requests, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Choosing a proxy for each request
//! - Issuing GET requests and rejecting anything but `200 OK`

use crate::config::CrawlerSettings;
use crate::url::proxy_url;
use crate::{ConfigError, CrawlError};
use reqwest::{Client, Proxy, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,
    /// HTTP status code (always 200)
    pub status: u16,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `settings` - Crawler settings (user agent, timeout)
/// * `proxy` - Proxy entry to tunnel every request through, if any
///
/// # Example
///
/// ```no_run
/// use github_search_crawler::config::CrawlerSettings;
/// use github_search_crawler::crawler::build_http_client;
///
/// let settings = CrawlerSettings::default();
/// let direct = build_http_client(&settings, None).unwrap();
/// let proxied = build_http_client(&settings, Some("194.126.37.94:8080")).unwrap();
/// ```
pub fn build_http_client(
    settings: &CrawlerSettings,
    proxy: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .gzip(true)
        .brotli(true);

    if let Some(secs) = settings.request_timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder = match proxy {
        Some(proxy) => builder.proxy(Proxy::all(proxy_url(proxy))?),
        // Ignore HTTP(S)_PROXY from the environment for direct requests
        None => builder.no_proxy(),
    };

    builder.build()
}

/// Picks one proxy uniformly at random, or `None` when there are none
pub fn select_proxy(proxies: &[String]) -> Option<&str> {
    if proxies.is_empty() {
        return None;
    }
    Some(proxies[rand::random_range(0..proxies.len())].as_str())
}

/// Shared HTTP transport for one crawl session
///
/// reqwest binds proxies to a client, so the transport keeps one direct
/// client plus one client per configured proxy. Every client has its own
/// connection pool and is safe to use from concurrent tasks.
#[derive(Debug)]
pub struct Transport {
    direct: Client,
    proxies: Vec<String>,
    proxied: HashMap<String, Client>,
}

impl Transport {
    /// Builds the clients for the given proxy set
    pub fn new(settings: &CrawlerSettings, proxies: &[String]) -> Result<Self, CrawlError> {
        let direct = build_http_client(settings, None)?;

        let mut proxied = HashMap::with_capacity(proxies.len());
        for proxy in proxies {
            let client = build_http_client(settings, Some(proxy)).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e))
            })?;
            proxied.insert(proxy.clone(), client);
        }

        Ok(Self {
            direct,
            proxies: proxies.to_vec(),
            proxied,
        })
    }

    /// Picks a proxy for the next request
    ///
    /// A fresh choice is made on every call; capture the result to reuse it.
    pub fn select_proxy(&self) -> Option<&str> {
        let selected = select_proxy(&self.proxies);
        tracing::info!(
            "Using proxy: {}",
            selected.map(proxy_url).unwrap_or_else(|| "none".to_string())
        );
        selected
    }

    /// Fetches a URL with a single GET request
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - The server answered `200 OK`
    /// * `Err(CrawlError::RequestProcess)` - Any other status code
    /// * `Err(CrawlError::Http)` - Transport-level failure (connect, timeout, body read)
    pub async fn fetch(&self, url: &Url, proxy: Option<&str>) -> Result<FetchedPage, CrawlError> {
        let client = match proxy {
            Some(proxy) => self.proxied.get(proxy).ok_or_else(|| {
                ConfigError::Validation(format!("Proxy '{}' is not configured", proxy))
            })?,
            None => &self.direct,
        };

        tracing::debug!("GET {}", url);

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CrawlError::RequestProcess {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }
}
