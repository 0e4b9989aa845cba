//! # Almanac Core
//!
//! The reversible edit engine behind Almanac: attributes and ordered maps
//! that edits operate on, invertible container diffs, composite and
//! continuous edits, and the undo/redo log.

pub mod attribute;
pub mod config;
pub mod edit;
pub mod ordered_map;

pub use attribute::MutableAttribute;
pub use config::{ConfigError, EditLogConfig};
pub use ordered_map::OrderedMap;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn init() {
    log::info!("Almanac Core v{} initialized", VERSION);
}
