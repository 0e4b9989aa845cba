//! `almanac.toml` loading.

use std::fs;
use std::io;
use std::path::Path;

use almanac_core::EditLogConfig;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Whole-application configuration.
///
/// ```toml
/// [edit_log]
/// max_undo = 200
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub edit_log: EditLogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// An `env_logger` filter; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, or the defaults if it does not exist. The flag tells
    /// whether the file was found.
    pub fn load(path: &Path) -> AppResult<(Self, bool)> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok((Self::default(), false)),
            Err(source) => {
                return Err(AppError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config = toml::from_str(&content).map_err(|source| AppError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok((config, true))
    }
}
