//! Run-wide settings shared by every stage of a sync run

use std::path::{Path, PathBuf};

use crate::config::ConfigDocument;

/// Settings that hold for the whole run, built once at startup and passed
/// by reference to resolution, target construction, composition and the
/// monitor loop.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Directory the run was started in; relative folders resolve against it
    pub working_dir: PathBuf,
    /// Configuration file name as given on the command line
    pub config_filename: String,
    /// Options passed with `-o/--rsync_options`
    pub cli_options: Vec<String>,
    /// Document-level `rsync_options`
    pub global_options: Vec<String>,
    pub dry_run: bool,
    pub verbose: bool,
}

impl RunContext {
    pub fn new(working_dir: PathBuf, config_filename: impl Into<String>) -> Self {
        Self {
            working_dir,
            config_filename: config_filename.into(),
            ..Default::default()
        }
    }

    /// Take the global options from a loaded document
    pub fn with_document(mut self, document: &ConfigDocument) -> Self {
        self.global_options = document.rsync_options.clone();
        self
    }

    /// Path of the configuration file relative to the working directory
    pub fn config_path(&self) -> PathBuf {
        self.resolve(&self.config_filename)
    }

    /// Resolve a folder from the config against the working directory
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(path)
    }
}
