//! HTML parsing for search and repository pages
//!
//! The search page is reduced to its anchors once; both extraction
//! strategies then filter that list. Repository pages are parsed for the
//! owner and the language breakdown.

use crate::item::RepositoryExtras;
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Class GitHub puts on repository result links
const REPOSITORY_LINK_CLASS: &str = "v-align-middle";

/// Marker inside `data-hydro-click` for genuine result links
const RESULT_CLICK_EVENT: &str = "search_result.click";

/// An `<a>` element from the search page, reduced to the attributes we filter on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
    pub classes: Vec<String>,
    pub hydro_click: Option<String>,
}

/// Anchors of a search results page, in document order
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub anchors: Vec<Anchor>,
}

/// A raw result link taken from the search page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultLink {
    pub href: String,
}

/// Parses a search page and keeps only its anchors
///
/// # Example
///
/// ```
/// use github_search_crawler::crawler::parse_search_page;
///
/// let page = parse_search_page(r#"<div><a href="/a" class="v-align-middle">a</a><p>x</p></div>"#);
/// assert_eq!(page.anchors.len(), 1);
/// assert_eq!(page.anchors[0].href.as_deref(), Some("/a"));
/// ```
pub fn parse_search_page(html: &str) -> SearchPage {
    let document = Html::parse_document(html);
    let mut anchors = Vec::new();

    if let Ok(a_selector) = Selector::parse("a") {
        for element in document.select(&a_selector) {
            let value = element.value();
            anchors.push(Anchor {
                href: value.attr("href").map(str::to_string),
                classes: value.classes().map(str::to_string).collect(),
                hydro_click: value.attr("data-hydro-click").map(str::to_string),
            });
        }
    }

    SearchPage { anchors }
}

/// Repository result links: anchors with the result-link class and an `href`
pub fn repository_links(page: &SearchPage) -> Vec<SearchResultLink> {
    page.anchors
        .iter()
        .filter(|a| a.classes.iter().any(|c| c == REPOSITORY_LINK_CLASS))
        .filter_map(|a| a.href.clone())
        .map(|href| SearchResultLink { href })
        .collect()
}

/// Issue and wiki result links: anchors whose click tracking marks a search result
///
/// Page order is preserved.
pub fn hydro_click_links(page: &SearchPage) -> Vec<SearchResultLink> {
    page.anchors
        .iter()
        .filter(|a| {
            a.hydro_click
                .as_deref()
                .is_some_and(|click| click.contains(RESULT_CLICK_EVENT))
        })
        .filter_map(|a| a.href.clone())
        .map(|href| SearchResultLink { href })
        .collect()
}

/// Extracts the owner and language breakdown from a repository page
///
/// - owner: text of the first `rel="author"` element
/// - language stats: every element whose `data-ga-click` mentions `stats`,
///   with text shaped like `"<Language>\n<Percent>%"`
///
/// # Errors
///
/// * `ExtractError::MissingOwner` - No author element on the page
/// * `ExtractError::MalformedLanguageStat` - A stats element lacks a language or a percentage
pub fn parse_repository_extras(html: &str, url: &str) -> Result<RepositoryExtras, ExtractError> {
    let document = Html::parse_document(html);

    let owner = Selector::parse(r#"[rel~="author"]"#)
        .ok()
        .and_then(|selector| document.select(&selector).next().map(element_text))
        .ok_or_else(|| ExtractError::MissingOwner {
            url: url.to_string(),
        })?;

    let mut language_stats = BTreeMap::new();
    if let Ok(stats_selector) = Selector::parse(r#"[data-ga-click*="stats"]"#) {
        for element in document.select(&stats_selector) {
            let (language, percent) = parse_language_stat(&element_text(element)).ok_or_else(
                || ExtractError::MalformedLanguageStat {
                    url: url.to_string(),
                    text: element_text(element),
                },
            )?;
            language_stats.insert(language, percent);
        }
    }

    Ok(RepositoryExtras {
        owner,
        language_stats,
    })
}

/// Splits `"Go\n  80.5%"` into `("Go", "80.5")`
fn parse_language_stat(text: &str) -> Option<(String, String)> {
    let cleaned = text.replace('%', "");
    let parts: Vec<&str> = cleaned
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    match parts.as_slice() {
        [language, .., percent] => Some((language.to_string(), percent.to_string())),
        _ => None,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
