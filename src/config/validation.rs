use crate::config::types::{CrawlConfig, CrawlerSettings, OutputSettings, SearchType, Settings};
use crate::ConfigError;
use serde_json::{Map, Value};
use url::Url;

/// Validates a raw parameters document and converts it into a [`CrawlConfig`]
///
/// The document must be an object with:
/// - `keywords`: array of at least one string (required)
/// - `type`: string (required)
/// - `proxies`: array of strings (optional)
///
/// Unknown keys are ignored. Once the shape is correct, `type` must name
/// one of the supported [`SearchType`]s.
///
/// # Errors
///
/// * `ConfigError::SchemaViolation` - The document does not have the shape above
/// * `ConfigError::InvalidSearchType` - `type` is a string but not a supported search type
pub fn validate_params(params: &Value) -> Result<CrawlConfig, ConfigError> {
    let object = params
        .as_object()
        .ok_or_else(|| schema_violation("parameters must be a JSON object"))?;

    let keywords = required_string_array(object, "keywords")?;
    if keywords.is_empty() {
        return Err(schema_violation("`keywords` must contain at least one item"));
    }

    let type_name = match object.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(schema_violation("`type` must be a string")),
        None => return Err(schema_violation("`type` is a required property")),
    };

    let proxies = match object.get("proxies") {
        Some(_) => required_string_array(object, "proxies")?,
        None => Vec::new(),
    };

    let search_type =
        SearchType::from_name(type_name).ok_or_else(|| ConfigError::InvalidSearchType {
            given: type_name.to_string(),
        })?;

    let config = CrawlConfig {
        keywords,
        search_type,
        proxies: dedup_preserving_order(proxies),
    };

    tracing::info!(
        "Parameters are valid: keywords={:?}, type={}, proxies={:?}",
        config.keywords,
        config.search_type,
        config.proxies
    );

    Ok(config)
}

/// Validates crawler settings
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    validate_crawler_settings(&settings.crawler)?;
    validate_output_settings(&settings.output)?;
    Ok(())
}

fn validate_crawler_settings(config: &CrawlerSettings) -> Result<(), ConfigError> {
    let host = Url::parse(&config.host)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid host '{}': {}", config.host, e)))?;

    if host.scheme() != "http" && host.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Host '{}' must use http or https",
            config.host
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout == Some(0) {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.max_concurrent_fetches == Some(0) {
        return Err(ConfigError::Validation(
            "max_concurrent_fetches must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_settings(config: &OutputSettings) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Reads `key` as an array of strings, failing if it is missing or mistyped
fn required_string_array(object: &Map<String, Value>, key: &str) -> Result<Vec<String>, ConfigError> {
    let values = match object.get(key) {
        Some(Value::Array(values)) => values,
        Some(_) => return Err(schema_violation(&format!("`{}` must be an array", key))),
        None => {
            return Err(schema_violation(&format!(
                "`{}` is a required property",
                key
            )))
        }
    };

    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            value.as_str().map(str::to_string).ok_or_else(|| {
                schema_violation(&format!("`{}[{}]` must be a string, got {}", key, i, value))
            })
        })
        .collect()
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn schema_violation(message: &str) -> ConfigError {
    ConfigError::SchemaViolation(message.to_string())
}
