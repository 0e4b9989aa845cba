use std::io;
use std::path::PathBuf;

use almanac_core::edit::EditError;
use almanac_planner::PlannerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Parse(String),
    #[error("no active entity {0}")]
    UnknownRef(String),
    #[error("nothing to {0}")]
    NothingTo(&'static str),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

pub type AppResult<T> = Result<T, AppError>;
