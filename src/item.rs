//! Scraped search result items

use crate::url::resolve_item_url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Value stored under an `extras` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Text(String),
    Map(BTreeMap<String, String>),
}

/// Additional data attached to an item by enrichment
pub type Extras = BTreeMap<String, ExtraValue>;

/// One search result, as written to the output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Absolute URL of the result
    pub url: String,

    /// Enrichment data; empty for results that are not enriched
    #[serde(default)]
    pub extras: Extras,
}

impl ResultItem {
    /// Creates an item from a scraped `href`, resolved against `host`
    pub fn from_href(host: &Url, href: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: resolve_item_url(host, href)?.to_string(),
            extras: Extras::new(),
        })
    }

    /// Returns the item with its extras replaced
    pub fn with_extras(self, extras: Extras) -> Self {
        Self { extras, ..self }
    }
}

impl fmt::Display for ResultItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResultItem(url={}, extras={:?})", self.url, self.extras)
    }
}

/// Data scraped from a repository page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryExtras {
    /// Repository owner login
    pub owner: String,

    /// Language name to percentage, without the `%` sign
    pub language_stats: BTreeMap<String, String>,
}

impl From<RepositoryExtras> for Extras {
    fn from(repo: RepositoryExtras) -> Self {
        let mut extras = Extras::new();
        extras.insert("owner".to_string(), ExtraValue::Text(repo.owner));
        extras.insert(
            "language_stats".to_string(),
            ExtraValue::Map(repo.language_stats),
        );
        extras
    }
}
