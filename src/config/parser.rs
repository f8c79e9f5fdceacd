use crate::config::types::{CrawlConfig, Settings};
use crate::config::validation::{validate_params, validate_settings};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses and validates a parameters file
///
/// # Arguments
///
/// * `path` - Path to the JSON parameters file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Successfully loaded and validated parameters
/// * `Err(ConfigError)` - The file is missing, is not JSON, or fails validation
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use github_search_crawler::config::load_params;
///
/// let config = load_params(Path::new("resources/parameters.json")).unwrap();
/// println!("Keywords: {:?}", config.keywords);
/// ```
pub fn load_params(path: &Path) -> Result<CrawlConfig, ConfigError> {
    let content = read_existing(path)?;
    parse_params(&content)
}

/// Computes a SHA-256 hash of the parameters file content
///
/// Logged next to the accepted parameters so a run can be matched to the
/// exact input it was given.
pub fn compute_params_hash(path: &Path) -> Result<String, ConfigError> {
    let content = read_existing(path)?;
    Ok(hash_content(&content))
}

/// Loads parameters and returns both the config and its hash
///
/// The file is read once; the hash covers exactly the content that was validated.
pub fn load_params_with_hash(path: &Path) -> Result<(CrawlConfig, String), ConfigError> {
    let content = read_existing(path)?;
    let config = parse_params(&content)?;
    Ok((config, hash_content(&content)))
}

/// Loads crawler settings from a TOML file, or the defaults when no path is given
///
/// # Arguments
///
/// * `path` - Optional path to the TOML settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully loaded and validated settings
/// * `Err(ConfigError)` - The file is missing, is not TOML, or fails validation
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings: Settings = match path {
        Some(path) => {
            let content = read_existing(path)?;
            toml::from_str(&content)?
        }
        None => Settings::default(),
    };

    validate_settings(&settings)?;

    Ok(settings)
}

fn parse_params(content: &str) -> Result<CrawlConfig, ConfigError> {
    let params: serde_json::Value = serde_json::from_str(content)?;
    tracing::info!("Provided parameters: {}", params);

    validate_params(&params)
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

fn read_existing(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.display().to_string(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}
