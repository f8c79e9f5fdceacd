//! JSON output of scraped items

use crate::item::ResultItem;
use crate::OutputError;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;

/// Writes the items to `output_path` as a pretty-printed JSON array
///
/// Existing content is overwritten. The parent directory must already exist.
///
/// # Arguments
///
/// * `items` - The scraped items, in aggregate order
/// * `output_path` - Path of the JSON file to write
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - The directory is missing, or serialization or the write failed
pub async fn write_items(items: &[ResultItem], output_path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(OutputError::MissingParent {
                path: output_path.display().to_string(),
            });
        }
    }

    let json = render_items(items)?;

    tokio::fs::write(output_path, json)
        .await
        .map_err(|source| OutputError::Io {
            path: output_path.display().to_string(),
            source,
        })
}

/// Renders the items as a JSON array indented with four spaces
pub fn render_items(items: &[ResultItem]) -> Result<Vec<u8>, OutputError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    items.serialize(&mut serializer)?;
    Ok(buf)
}
