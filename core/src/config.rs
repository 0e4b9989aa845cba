//! Edit log configuration, loaded from the `[edit_log]` table of a TOML file.

use serde::Deserialize;
use thiserror::Error;

use crate::edit::DEFAULT_MAX_UNDO;

/// Settings for an [`EditLog`](crate::edit::EditLog).
///
/// ```toml
/// [edit_log]
/// max_undo = 200
/// start_locked = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditLogConfig {
    /// Undo depth. The oldest entry is dropped past this many.
    pub max_undo: usize,
    /// Start with the log locked until [`EditLog::open`] is called, so that
    /// edits used to load initial data are not recorded.
    ///
    /// [`EditLog::open`]: crate::edit::EditLog::open
    pub start_locked: bool,
}

impl Default for EditLogConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
            start_locked: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse edit log config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EditLogConfig {
    /// Parses a bare `EditLogConfig` table (no `[edit_log]` header).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
