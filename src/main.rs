//! rbc CLI
//!
//! Command-line interface for syncing a directory with the entries of a
//! `.sync.toml` file.

use clap::Parser;
use clap::builder::FalseyValueParser;
use colored::Colorize;
use std::env;
use std::process;
use tracing::Level;

use rbc::config::CONFIG_FILE_NAME;
use rbc::transfer::DEFAULT_PROGRAM;
use rbc::{RunOptions, SyncError};

/// Use the entry ENTRY of the config file to synchronize the files of the
/// current directory. Without ENTRY, the entry with `default = true` is
/// taken, or else the last entry of the file.
///
/// Entries look like:
///
///   [entry]
///   hostname = "remotecomputer"
///   target_folder = "/user/myuser/directory/"
///   rsync_options = ["--a", "--b"]
///   default = true
///
/// Further keys are `source_folder` (sync this folder instead of the
/// current one) and `gather` (swap source and destination).
#[derive(Parser)]
#[command(name = "rbc")]
#[command(author, version, verbatim_doc_comment)]
struct Cli {
    /// Entry to sync; several entries can be given comma-separated
    entry: Option<String>,

    /// Keep running and sync on every change in the source folder
    #[arg(short, long, env = "RBC_MONITOR", value_parser = FalseyValueParser::new())]
    monitor: bool,

    /// Name of the configuration file
    #[arg(long = "config_file", env = "RBC_CONFIG_FILE", default_value = CONFIG_FILE_NAME)]
    config_file: String,

    /// Additional options to call rsync with (repeatable)
    #[arg(short = 'o', long = "rsync_options", allow_hyphen_values = true)]
    rsync_options: Vec<String>,

    /// Call rsync as a dry run
    #[arg(long, env = "RBC_DRYRUN", value_parser = FalseyValueParser::new())]
    dryrun: bool,

    /// Show diagnostic output
    #[arg(long, env = "RBC_VERBOSE", value_parser = FalseyValueParser::new())]
    verbose: bool,

    /// List the entries of the config file and exit
    #[arg(long, env = "RBC_LISTHOSTS", value_parser = FalseyValueParser::new())]
    listhosts: bool,

    /// Program to run instead of rsync
    #[arg(long = "rsync_binary", env = "RBC_RSYNC_BINARY", default_value = DEFAULT_PROGRAM, hide = true)]
    rsync_binary: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        tracing::debug!(
            "Running rbc {} in verbose mode. Current datetime: {}",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now()
        );
    }

    let working_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{} Cannot determine the current directory: {}", "✘".red(), e);
            process::exit(1);
        }
    };

    let options = RunOptions {
        entry: cli.entry.unwrap_or_default(),
        config_file: cli.config_file,
        working_dir,
        monitor: cli.monitor,
        list_hosts: cli.listhosts,
        rsync_options: cli.rsync_options,
        dry_run: cli.dryrun,
        verbose: cli.verbose,
        rsync_binary: cli.rsync_binary,
    };

    if let Err(e) = rbc::run(&options) {
        exit_with(e);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// The one place where errors become exit codes
fn exit_with(error: SyncError) -> ! {
    eprintln!("{} {}", "✘".red(), error.to_string().red());
    process::exit(error.exit_code());
}
