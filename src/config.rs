//! Configuration parsing for rbc
//!
//! Handles the TOML document that names the sync entries. Every top-level
//! table is one entry; a top-level `rsync_options` key holds options that
//! apply to all entries. Deprecated key aliases are folded into their
//! current names in a single pass right after parsing.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = ".sync.toml";

/// Key holding rsync options, both at document and at entry level
const RSYNC_OPTIONS_KEY: &str = "rsync_options";

/// Entry keys that still work but have been renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeprecatedKey {
    LocalFolder,
    RemoteFolder,
}

impl DeprecatedKey {
    pub fn old_name(self) -> &'static str {
        match self {
            DeprecatedKey::LocalFolder => "local_folder",
            DeprecatedKey::RemoteFolder => "remote_folder",
        }
    }

    pub fn new_name(self) -> &'static str {
        match self {
            DeprecatedKey::LocalFolder => "source_folder",
            DeprecatedKey::RemoteFolder => "target_folder",
        }
    }
}

/// Entry table as written in the file
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    source_folder: Option<String>,
    #[serde(default)]
    local_folder: Option<String>,
    #[serde(default)]
    target_folder: Option<String>,
    #[serde(default)]
    remote_folder: Option<String>,
    #[serde(default)]
    rsync_options: Option<toml::Value>,
    #[serde(default)]
    gather: bool,
    #[serde(default)]
    default: bool,
}

/// One named sync entry after alias normalization
#[derive(Debug, Clone)]
pub struct EntrySpec {
    pub name: String,
    /// Presence means the target lives on a remote host
    pub hostname: Option<String>,
    /// Explicit source folder; the working directory is used when absent
    pub source_folder: Option<String>,
    pub target_folder: Option<String>,
    /// Entry-scoped rsync options, in document order
    pub rsync_options: Vec<String>,
    /// Swap source and destination (pull instead of push)
    pub gather: bool,
    pub default: bool,
    /// Deprecated keys this entry was written with
    pub deprecated: Vec<DeprecatedKey>,
    /// The entry table exactly as written, for listing
    pub raw: toml::Table,
}

impl EntrySpec {
    fn from_table(name: &str, table: &toml::Table) -> anyhow::Result<Self> {
        let raw: RawEntry = toml::Value::Table(table.clone())
            .try_into()
            .with_context(|| format!("invalid entry [{}]", name))?;

        let mut deprecated = Vec::new();

        let source_folder = match (raw.source_folder, raw.local_folder) {
            (Some(source), _) => Some(source),
            (None, Some(local)) => {
                deprecated.push(DeprecatedKey::LocalFolder);
                Some(local)
            }
            (None, None) => None,
        };

        let target_folder = match (raw.target_folder, raw.remote_folder) {
            (Some(target), _) => Some(target),
            (None, Some(remote)) => {
                deprecated.push(DeprecatedKey::RemoteFolder);
                Some(remote)
            }
            (None, None) => None,
        };

        Ok(Self {
            name: name.to_string(),
            hostname: raw.hostname,
            source_folder,
            target_folder,
            rsync_options: raw
                .rsync_options
                .as_ref()
                .map(stringify_options)
                .unwrap_or_default(),
            gather: raw.gather,
            default: raw.default,
            deprecated,
            raw: table.clone(),
        })
    }
}

/// Parsed configuration file
#[derive(Debug)]
pub struct ConfigDocument {
    path: PathBuf,
    entries: Vec<EntrySpec>,
    /// Document-level rsync options, stringified
    pub rsync_options: Vec<String>,
}

impl ConfigDocument {
    /// Load configuration from a file.
    ///
    /// The file is read once; a missing file is reported as
    /// [`SyncError::ConfigNotFound`] before anything else is attempted.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        if !path.is_file() {
            return Err(SyncError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))
            .map_err(|source| SyncError::ConfigInvalid {
                path: path.to_path_buf(),
                source,
            })?;

        let document = Self::parse(&content, path).map_err(|source| SyncError::ConfigInvalid {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), entries = document.entries.len(), "Loaded config file");
        Ok(document)
    }

    /// Parse a document from TOML text. `path` is only recorded, not read.
    pub fn parse(content: &str, path: &Path) -> anyhow::Result<Self> {
        let table: toml::Table = toml::from_str(content).context("not a valid TOML document")?;

        let mut entries = Vec::new();
        let mut rsync_options = Vec::new();

        for (key, value) in &table {
            match value {
                toml::Value::Table(entry) => entries.push(EntrySpec::from_table(key, entry)?),
                _ if key == RSYNC_OPTIONS_KEY => {
                    rsync_options = stringify_options(value);
                    tracing::debug!(options = ?rsync_options, "Global rsync_options key given in config file");
                }
                _ => tracing::debug!(key = %key, "Ignoring top-level key that is not an entry"),
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            rsync_options,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in document order
    pub fn entries(&self) -> &[EntrySpec] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&EntrySpec> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entry_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turn an option value (list or single scalar) into rsync arguments.
fn stringify_options(value: &toml::Value) -> Vec<String> {
    match value {
        toml::Value::Array(items) => items.iter().map(stringify_scalar).collect(),
        other => vec![stringify_scalar(other)],
    }
}

fn stringify_scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
