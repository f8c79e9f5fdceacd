//! URL construction for search requests and scraped results
//!
//! Everything is resolved against a single host base (GitHub by default).

use crate::config::CrawlConfig;
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Builds the search page URL for a crawl
///
/// Keywords are percent-encoded individually and joined with a literal `+`,
/// which the search page reads as a space. The search type is sent lower-cased.
///
/// # Examples
///
/// ```
/// use github_search_crawler::config::{CrawlConfig, SearchType};
/// use github_search_crawler::url::build_search_url;
/// use url::Url;
///
/// let host = Url::parse("https://github.com").unwrap();
/// let config = CrawlConfig {
///     keywords: vec!["openstack".to_string(), "nova".to_string()],
///     search_type: SearchType::Repositories,
///     proxies: vec![],
/// };
///
/// let url = build_search_url(&host, &config).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://github.com/search?q=openstack+nova&type=repositories"
/// );
/// ```
pub fn build_search_url(host: &Url, config: &CrawlConfig) -> Result<Url, url::ParseError> {
    let q = config
        .keywords
        .iter()
        .map(|keyword| encode_keyword(keyword))
        .collect::<Vec<_>>()
        .join("+");

    let query = format!(
        "search?q={}&type={}",
        q,
        encode_component(&config.search_type.query_value())
    );

    host.join(&query)
}

/// Resolves a scraped `href` against the host base
///
/// Absolute links are kept as they are; relative ones (`/owner/repo`) become
/// absolute under the host.
pub fn resolve_item_url(host: &Url, href: &str) -> Result<Url, url::ParseError> {
    host.join(href.trim())
}

/// Turns a configured proxy entry into a proxy URL
///
/// Entries are usually bare `host:port` pairs and get an `https://` scheme;
/// entries that already name a scheme are used verbatim.
pub fn proxy_url(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("https://{}", proxy)
    }
}

/// Encodes one keyword, keeping any `+` it already contains
fn encode_keyword(keyword: &str) -> String {
    keyword
        .split('+')
        .map(encode_component)
        .collect::<Vec<_>>()
        .join("+")
}

/// `application/x-www-form-urlencoded` byte serialization: alphanumerics and
/// `*-._` pass through, space becomes `+`, everything else (including `~`) is
/// percent-encoded. The search page decodes `%7E` and `~` alike.
fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
