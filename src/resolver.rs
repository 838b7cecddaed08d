//! Entry resolution
//!
//! Decides which configuration entries take part in a run: the requested
//! comma-separated names, or the default entry when nothing was requested.

use crate::config::ConfigDocument;
use crate::context::RunContext;
use crate::error::SyncError;

/// Entries selected for this run, in the order they will be synced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub names: Vec<String>,
    pub multi_target: bool,
}

/// Resolve the requested entry string against the document.
///
/// An empty request picks the *last* entry marked `default = true`, or the
/// last entry of the document when none is marked. A non-empty request is
/// split on commas (no trimming) and every name must exist.
pub fn resolve(
    document: &ConfigDocument,
    requested: &str,
    ctx: &RunContext,
) -> Result<Resolution, SyncError> {
    if document.is_empty() {
        return Err(SyncError::NoEntries {
            config_file: ctx.config_filename.clone(),
        });
    }

    if requested.is_empty() {
        resolve_default(document)
    } else {
        resolve_requested(document, requested, ctx)
    }
}

fn resolve_default(document: &ConfigDocument) -> Result<Resolution, SyncError> {
    tracing::debug!("No entry was explicitly specified; trying to determine from config file");

    let entries = document.entries();
    // Later defaults override earlier ones.
    let chosen = entries
        .iter()
        .rev()
        .find(|e| e.default)
        .or_else(|| entries.last())
        .map(|e| e.name.clone())
        .ok_or_else(|| SyncError::NoEntries {
            config_file: document.path().display().to_string(),
        })?;

    if document.entry(&chosen).is_some_and(|e| e.default) {
        tracing::debug!(entry = %chosen, "Found default entry");
    }

    Ok(Resolution {
        names: vec![chosen],
        multi_target: false,
    })
}

fn resolve_requested(
    document: &ConfigDocument,
    requested: &str,
    ctx: &RunContext,
) -> Result<Resolution, SyncError> {
    let names: Vec<String> = requested.split(',').map(str::to_string).collect();

    if let Some(missing) = names.iter().find(|n| document.entry(n).is_none()) {
        return Err(SyncError::UnknownEntry {
            name: missing.clone(),
            known: document.entry_names(),
            config_file: ctx.config_filename.clone(),
        });
    }

    let multi_target = names.len() > 1;
    if multi_target {
        tracing::debug!("Using entries {}", names.join(", "));
    } else {
        tracing::debug!(entry = %names[0], "Using entry");
    }

    Ok(Resolution {
        names,
        multi_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn doc(toml: &str) -> ConfigDocument {
        ConfigDocument::parse(toml, Path::new(".sync.toml")).unwrap()
    }

    fn ctx() -> RunContext {
        RunContext::new("/work".into(), ".sync.toml")
    }

    #[test]
    fn test_single_entry_without_default() {
        let d = doc("[only]\ntarget_folder = \"/x\"\n");
        let r = resolve(&d, "", &ctx()).unwrap();
        assert_eq!(r.names, vec!["only"]);
        assert!(!r.multi_target);
    }

    #[test]
    fn test_no_default_falls_back_to_last_entry() {
        let d = doc(
            r#"
            [first]
            target_folder = "/1"
            [second]
            target_folder = "/2"
            [third]
            target_folder = "/3"
        "#,
        );
        assert_eq!(resolve(&d, "", &ctx()).unwrap().names, vec!["third"]);
    }

    #[test]
    fn test_last_default_wins() {
        let d = doc(
            r#"
            [a]
            target_folder = "/a"
            default = true
            [b]
            target_folder = "/b"
            default = true
            [c]
            target_folder = "/c"
        "#,
        );
        assert_eq!(resolve(&d, "", &ctx()).unwrap().names, vec!["b"]);
    }

    #[test]
    fn test_default_false_is_not_a_default() {
        let d = doc(
            r#"
            [a]
            target_folder = "/a"
            default = true
            [b]
            target_folder = "/b"
            default = false
        "#,
        );
        assert_eq!(resolve(&d, "", &ctx()).unwrap().names, vec!["a"]);
    }

    #[test]
    fn test_requested_names_keep_order() {
        let d = doc(
            r#"
            [a]
            target_folder = "/a"
            [b]
            target_folder = "/b"
            [c]
            target_folder = "/c"
        "#,
        );
        let r = resolve(&d, "c,a,b", &ctx()).unwrap();
        assert_eq!(r.names, vec!["c", "a", "b"]);
        assert!(r.multi_target);

        let r = resolve(&d, "b", &ctx()).unwrap();
        assert_eq!(r.names, vec!["b"]);
        assert!(!r.multi_target);
    }

    #[test]
    fn test_unknown_entry_names_first_missing() {
        let d = doc("[a]\ntarget_folder = \"/a\"\n[b]\ntarget_folder = \"/b\"\n");
        match resolve(&d, "a,x,y", &ctx()) {
            Err(SyncError::UnknownEntry { name, known, .. }) => {
                assert_eq!(name, "x");
                assert_eq!(known, vec!["a", "b"]);
            }
            other => panic!("expected UnknownEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_names_are_not_trimmed() {
        let d = doc("[a]\ntarget_folder = \"/a\"\n[b]\ntarget_folder = \"/b\"\n");
        let result = resolve(&d, "a, b", &ctx());
        assert!(matches!(result, Err(SyncError::UnknownEntry { name, .. }) if name == " b"));
    }

    #[test]
    fn test_empty_document() {
        let d = doc("rsync_options = [\"-z\"]\n");
        assert!(matches!(
            resolve(&d, "", &ctx()),
            Err(SyncError::NoEntries { .. })
        ));
    }
}
