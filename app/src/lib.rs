//! # Almanac App
//!
//! The `almanac` command-line front end: configuration loading, the
//! command language and the session that runs commands against one
//! [`Planner`](almanac_planner::Planner) and its edit log.
//!
//! ## Example
//!
//! ```ignore
//! use almanac_app::{AppConfig, Session};
//!
//! let mut session = Session::new(&AppConfig::default(), today)?;
//! session.run_line("task add Write report")?;
//! session.run_line("task status #1 done")?;
//! session.run_line("undo")?;
//! ```

mod args;
mod command;
mod config;
mod error;
mod session;

pub use args::{AlmanacArgs, CliLogLevel};
pub use command::{Command, HELP, Ref, parse_line};
pub use config::{AppConfig, LoggingConfig};
pub use error::{AppError, AppResult};
pub use session::Session;

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn init() {
    log::info!("Almanac v{} initialized", VERSION);
}
