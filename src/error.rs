//! Error taxonomy for a sync run
//!
//! Every fatal condition maps to one variant and one stable exit code.
//! `main` is the only place that turns a `SyncError` into a process exit.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Please make sure {} exists in the current directory!", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Could not parse {}: {source:#}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{config_file} does not contain any entries. Please add one!")]
    NoEntries { config_file: String },

    #[error(
        "No entry {name} is known in {config_file}. Please edit the file!\nKnown entries are: {}",
        .known.join(", ")
    )]
    UnknownEntry {
        name: String,
        known: Vec<String>,
        config_file: String,
    },

    #[error("The entry {entry} does not have a target folder location. Please edit {config_file}!")]
    MissingTargetFolder { entry: String, config_file: String },

    #[error(
        "You specified the source folder {} to be synced. This folder does not exist!",
        .0.display()
    )]
    SourceNotFound(PathBuf),

    #[error("You specified the target folder {}. This folder does not exist!", .0.display())]
    TargetNotFound(PathBuf),

    #[error("The entry {0} gathers into the source folder and cannot be used in monitor mode")]
    GatherMonitorConflict(String),

    #[error("rsync failed for entry {entry} ({status}):\n{output}")]
    TransferToolError {
        entry: String,
        status: String,
        output: String,
    },

    #[error("Could not watch {}: {source:#}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    /// Process exit status for this error. Code 2 is left to clap's usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::ConfigInvalid { .. } => 1,
            SyncError::ConfigNotFound(_) => 3,
            SyncError::MissingTargetFolder { .. } => 4,
            SyncError::UnknownEntry { .. } => 5,
            SyncError::TargetNotFound(_) => 6,
            SyncError::SourceNotFound(_) => 7,
            SyncError::GatherMonitorConflict(_) => 8,
            SyncError::TransferToolError { .. } => 9,
            SyncError::NoEntries { .. } => 10,
            SyncError::Watch { .. } => 11,
        }
    }
}
