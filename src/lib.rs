//! rbc - rsync by config
//!
//! Picks a named entry from a `.sync.toml` file, composes an rsync command
//! for it and runs it once, or again on every change below the source
//! folder in monitor mode.

pub mod app;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod listing;
pub mod monitor;
pub mod resolver;
pub mod signals;
pub mod target;
pub mod transfer;
pub mod watch;

pub use app::{Outcome, RunOptions, run};
pub use config::{ConfigDocument, EntrySpec};
pub use context::RunContext;
pub use error::SyncError;
pub use target::SyncTarget;
