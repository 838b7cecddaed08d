//! Sync target construction
//!
//! Turns a configuration entry into a resolved [`SyncTarget`]: which folder
//! is the source, where the destination lives (local or on a host), and
//! whether the direction is inverted (`gather`).

use std::collections::HashSet;
use std::path::PathBuf;

use crate::config::{ConfigDocument, DeprecatedKey, EntrySpec};
use crate::context::RunContext;
use crate::error::SyncError;
use crate::resolver::Resolution;

/// One entry, resolved and checked, ready to be composed into a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub entry: String,
    pub hostname: Option<String>,
    /// Source folder as it will be handed to rsync (before the trailing slash)
    pub source_dir: String,
    pub target_folder: String,
    /// Entry-scoped rsync options
    pub options: Vec<String>,
    pub gather: bool,
}

impl SyncTarget {
    /// Resolve directories and roles for one entry.
    ///
    /// Local folders are checked for existence; a target with a hostname is
    /// taken as-is.
    pub fn build(spec: &EntrySpec, ctx: &RunContext) -> Result<Self, SyncError> {
        let source_dir = resolve_source(spec, ctx)?;
        let target_folder = resolve_target(spec, ctx)?;

        if spec.gather {
            tracing::debug!(entry = %spec.name, "gather is turned ON! Collecting to {}", source_dir);
        }

        Ok(Self {
            entry: spec.name.clone(),
            hostname: spec.hostname.clone(),
            source_dir,
            target_folder,
            options: spec.rsync_options.clone(),
            gather: spec.gather,
        })
    }

    /// Directory to watch in monitor mode
    pub fn watch_root(&self, ctx: &RunContext) -> PathBuf {
        ctx.resolve(&self.source_dir)
    }

    /// Destination as rsync sees it: `host:folder` for remote targets
    pub fn destination(&self) -> String {
        match &self.hostname {
            Some(host) => format!("{}:{}", host, self.target_folder),
            None => self.target_folder.clone(),
        }
    }
}

fn resolve_source(spec: &EntrySpec, ctx: &RunContext) -> Result<String, SyncError> {
    let Some(source) = &spec.source_folder else {
        let source = ctx.working_dir.display().to_string();
        tracing::debug!(entry = %spec.name, "Using source folder {}", source);
        return Ok(source);
    };

    let resolved = ctx.resolve(source);
    if !resolved.is_dir() {
        return Err(SyncError::SourceNotFound(PathBuf::from(source)));
    }

    tracing::debug!(entry = %spec.name, "Running with explicit source folder {}", source);
    Ok(source.clone())
}

fn resolve_target(spec: &EntrySpec, ctx: &RunContext) -> Result<String, SyncError> {
    let target = spec
        .target_folder
        .clone()
        .ok_or_else(|| SyncError::MissingTargetFolder {
            entry: spec.name.clone(),
            config_file: ctx.config_filename.clone(),
        })?;
    tracing::debug!(entry = %spec.name, "The target folder path is {}", target);

    match &spec.hostname {
        Some(host) => {
            tracing::debug!(entry = %spec.name, "The remote hostname is {}", host);
        }
        None => {
            tracing::debug!(entry = %spec.name, "No hostname specified. Targeting local transfers.");
            if !ctx.resolve(&target).is_dir() {
                return Err(SyncError::TargetNotFound(PathBuf::from(&target)));
            }
        }
    }

    Ok(target)
}

/// Emits each deprecation notice once per run, however many entries use the
/// deprecated key.
#[derive(Debug, Default)]
pub struct DeprecationNotices {
    shown: HashSet<DeprecatedKey>,
}

impl DeprecationNotices {
    /// Warn about deprecated keys in `spec` that have not been reported yet.
    /// Returns the keys reported by this call.
    pub fn report(&mut self, spec: &EntrySpec, ctx: &RunContext) -> Vec<DeprecatedKey> {
        let mut reported = Vec::new();
        for key in &spec.deprecated {
            if self.shown.insert(*key) {
                tracing::warn!(
                    "Key `{old}` is deprecated. Please use `{new}`! The following command will in-place modify the file:\n\tsed -i -- 's/{old}/{new}/g' {file}",
                    old = key.old_name(),
                    new = key.new_name(),
                    file = ctx.config_filename,
                );
                reported.push(*key);
            }
        }
        reported
    }
}

/// Build targets for every resolved entry, in resolution order.
///
/// All configuration errors surface here, before any transfer runs.
pub fn build_targets(
    document: &ConfigDocument,
    resolution: &Resolution,
    ctx: &RunContext,
) -> Result<Vec<SyncTarget>, SyncError> {
    let mut notices = DeprecationNotices::default();
    let mut targets = Vec::with_capacity(resolution.names.len());

    for name in &resolution.names {
        let spec = document
            .entry(name)
            .ok_or_else(|| SyncError::UnknownEntry {
                name: name.clone(),
                known: document.entry_names(),
                config_file: ctx.config_filename.clone(),
            })?;
        notices.report(spec, ctx);
        targets.push(SyncTarget::build(spec, ctx)?);
    }

    Ok(targets)
}
