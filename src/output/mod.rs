//! Output module for persisting scraped items
//!
//! Items are written once, at the end of a successful run, as a single
//! pretty-printed JSON array.

mod json;

pub use json::{render_items, write_items};
