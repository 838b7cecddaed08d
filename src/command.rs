//! rsync command composition
//!
//! Builds the argument list and the ordered (source, destination) pair for
//! one target. A fresh [`TransferInvocation`] is composed for every
//! transfer so run settings are read each time.

use std::path::PathBuf;

use crate::context::RunContext;
use crate::target::SyncTarget;

/// Flags every transfer starts with, in this order
pub const BASELINE_FLAGS: [&str; 7] = [
    "--archive",
    "--human-readable",
    "--verbose",
    "--recursive",
    "--compress",
    "--cvs-exclude",
    "--exclude=*.bin",
];

pub const DRY_RUN_FLAG: &str = "--dry-run";

/// Everything needed to run rsync once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInvocation {
    pub entry: String,
    pub args: Vec<String>,
    pub source: String,
    pub destination: String,
    /// Directory the transfer runs in
    pub working_dir: PathBuf,
}

impl TransferInvocation {
    /// Full argument vector: flags followed by source and destination
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push(self.source.clone());
        argv.push(self.destination.clone());
        argv
    }
}

/// Compose the transfer for `target`.
///
/// Option order is baseline, dry-run, entry options, global options, CLI
/// options. Conflicting flags are left to rsync.
pub fn compose(target: &SyncTarget, ctx: &RunContext) -> TransferInvocation {
    let mut args: Vec<String> = BASELINE_FLAGS.iter().map(|f| f.to_string()).collect();
    args.push(format!("--exclude={}", ctx.config_filename));

    if ctx.dry_run {
        tracing::debug!("--dryrun is turned ON!");
        args.push(DRY_RUN_FLAG.to_string());
    }
    args.extend(target.options.iter().cloned());
    args.extend(ctx.global_options.iter().cloned());
    args.extend(ctx.cli_options.iter().cloned());

    tracing::debug!(entry = %target.entry, "All rsync options: {:?}", args);

    let mut source = target.source_dir.clone();
    if !source.ends_with('/') {
        source.push('/');
    }
    let mut destination = target.destination();

    if target.gather {
        std::mem::swap(&mut source, &mut destination);
    }

    TransferInvocation {
        entry: target.entry.clone(),
        args,
        source,
        destination,
        working_dir: ctx.working_dir.clone(),
    }
}
