//! Run orchestration
//!
//! Loads the configuration, resolves the entries and targets, then either
//! syncs once or hands over to the monitor loop. Errors are returned, never
//! turned into exits here.

use colored::Colorize;
use std::path::PathBuf;

use crate::command::compose;
use crate::config::{CONFIG_FILE_NAME, ConfigDocument};
use crate::context::RunContext;
use crate::error::SyncError;
use crate::listing::render_entries;
use crate::monitor::{MonitorReport, watch_and_sync};
use crate::resolver::resolve;
use crate::target::{SyncTarget, build_targets};
use crate::transfer::{DEFAULT_PROGRAM, Rsync, Transfer};

/// What the user asked for on the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Entry name, comma-separated names, or empty for the default entry
    pub entry: String,
    pub config_file: String,
    pub working_dir: PathBuf,
    pub monitor: bool,
    pub list_hosts: bool,
    pub rsync_options: Vec<String>,
    pub dry_run: bool,
    pub verbose: bool,
    pub rsync_binary: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            entry: String::new(),
            config_file: CONFIG_FILE_NAME.to_string(),
            working_dir: PathBuf::from("."),
            monitor: false,
            list_hosts: false,
            rsync_options: Vec::new(),
            dry_run: false,
            verbose: false,
            rsync_binary: DEFAULT_PROGRAM.to_string(),
        }
    }
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Listed,
    /// One-shot run; number of targets synced
    Synced(usize),
    Monitored(MonitorReport),
}

/// Run with rsync as the transfer tool
pub fn run(options: &RunOptions) -> Result<Outcome, SyncError> {
    let transfer = Rsync::new(&options.rsync_binary);
    run_with(options, &transfer)
}

/// Run with any transfer implementation
pub fn run_with<T: Transfer>(options: &RunOptions, transfer: &T) -> Result<Outcome, SyncError> {
    let mut ctx = RunContext::new(options.working_dir.clone(), options.config_file.clone());
    ctx.cli_options = options.rsync_options.clone();
    ctx.dry_run = options.dry_run;
    ctx.verbose = options.verbose;

    let document = ConfigDocument::load(&ctx.config_path())?;

    if options.list_hosts {
        tracing::debug!("Listing available entries");
        print!("{}", render_entries(&document, &ctx));
        return Ok(Outcome::Listed);
    }

    let ctx = ctx.with_document(&document);
    let resolution = resolve(&document, &options.entry, &ctx)?;
    if options.entry.is_empty() {
        println!("Using entry: {}", resolution.names[0].bold());
    }

    let targets = build_targets(&document, &resolution, &ctx)?;

    if options.monitor {
        tracing::debug!("Running in monitor mode");
        let report = watch_and_sync(&targets, &ctx, transfer)?;
        println!(
            "{}",
            format!("~~ Synced {} times in total", report.invocations).yellow()
        );
        return Ok(Outcome::Monitored(report));
    }

    let synced = sync_once(&targets, &ctx, transfer, resolution.multi_target)?;
    Ok(Outcome::Synced(synced))
}

/// Sync every target once, in order, stopping at the first failure.
pub fn sync_once<T: Transfer>(
    targets: &[SyncTarget],
    ctx: &RunContext,
    transfer: &T,
    announce: bool,
) -> Result<usize, SyncError> {
    for target in targets {
        if announce {
            println!("{} {}", "➤ Syncing entry".cyan().bold(), target.entry.bold());
        }
        let invocation = compose(target, ctx);
        let output = transfer.run(&invocation)?;
        print!("{}", output);
    }
    Ok(targets.len())
}
