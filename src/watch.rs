//! File system watching for monitor mode
//!
//! [`DirectoryWatcher`] turns notify's events into plain [`FsEvent`]s and
//! hands them to a callback; [`is_eligible`] decides which of them should
//! trigger a sync. Filtering and fan-out live outside the watcher.

use anyhow::{Context, Result};
use glob::Pattern;
use lazy_static::lazy_static;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

lazy_static! {
    /// Hidden temporary files written by editors
    static ref HIDDEN_TMP: Pattern =
        Pattern::new(".*.tmp").expect("hidden tmp pattern is a valid glob");
}

/// Path component marking version control metadata
const VCS_MARKER: &str = ".git";

/// A change reported by the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub path: PathBuf,
    pub is_directory: bool,
}

impl FsEvent {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
        }
    }
}

/// Whether a change should trigger a sync.
///
/// Directory events, anything under version control metadata and hidden
/// temporary files (`.*.tmp`) are dropped.
pub fn is_eligible(event: &FsEvent) -> bool {
    if event.is_directory {
        return false;
    }

    let path = event.path.to_string_lossy();
    if path.contains(VCS_MARKER) {
        return false;
    }

    let name = event
        .path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or(path);
    !HIDDEN_TMP.matches(&name)
}

/// Recursive subscription to changes below one directory
pub struct DirectoryWatcher {
    root: PathBuf,
    watcher: RecommendedWatcher,
}

impl DirectoryWatcher {
    /// Start watching `root` recursively; every change is passed to `on_event`.
    pub fn subscribe<F>(root: &Path, mut on_event: F) -> Result<Self>
    where
        F: FnMut(FsEvent) + Send + 'static,
    {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Some(fs_event) = convert(event) {
                    on_event(fs_event);
                }
            }
            Err(e) => tracing::warn!(error = %e, "File watcher error"),
        })
        .context("Failed to create file watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;

        tracing::debug!(root = %root.display(), "Watching for changes");

        Ok(Self {
            root: root.to_path_buf(),
            watcher,
        })
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(mut self) {
        if let Err(e) = self.watcher.unwatch(&self.root) {
            tracing::debug!(error = %e, "Failed to unwatch {}", self.root.display());
        }
    }
}

/// Reduce a notify event to the changed path. Access events are not
/// changes; a write is already reported as a modification.
fn convert(event: Event) -> Option<FsEvent> {
    if matches!(event.kind, EventKind::Access(_)) {
        return None;
    }
    let path = event.paths.into_iter().next()?;
    let is_directory = path.is_dir();
    Some(FsEvent { path, is_directory })
}
