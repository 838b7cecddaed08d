//! Monitor mode
//!
//! Watches the first target's source folder and runs every resolved target
//! once per eligible change. Events arrive on one queue consumed by a single
//! thread, so filtering, counting and the fan-out for an event form one unit
//! and no two transfers ever overlap. An interrupt sets the shutdown flag;
//! the loop finishes the running cycle and drops whatever is still queued.
//!
//! There is no debouncing: a burst of N eligible events gives N sync cycles.

use chrono::Local;
use colored::Colorize;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::command::compose;
use crate::context::RunContext;
use crate::error::SyncError;
use crate::signals::{self, ShutdownFlag, is_shutdown_requested};
use crate::target::SyncTarget;
use crate::transfer::Transfer;
use crate::watch::{DirectoryWatcher, FsEvent, is_eligible};

/// How long an idle loop waits before looking at the shutdown flag again
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Watching,
    Triggering,
    Stopped,
}

/// Outcome of a monitor run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonitorReport {
    /// Eligible events handled, one sync cycle each
    pub invocations: u64,
    /// Individual target transfers that failed
    pub failures: usize,
}

/// Event consumer and fan-out over the resolved targets
pub struct MonitorLoop<'a, T: Transfer> {
    targets: &'a [SyncTarget],
    ctx: &'a RunContext,
    transfer: &'a T,
    state: MonitorState,
    report: MonitorReport,
}

impl<'a, T: Transfer> MonitorLoop<'a, T> {
    pub fn new(targets: &'a [SyncTarget], ctx: &'a RunContext, transfer: &'a T) -> Self {
        Self {
            targets,
            ctx,
            transfer,
            state: MonitorState::Idle,
            report: MonitorReport::default(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn invocations(&self) -> u64 {
        self.report.invocations
    }

    /// Consume events until shutdown is requested or every sender is gone.
    ///
    /// The flag is checked before every wait and after every event, so
    /// events still queued when it is set are not synced.
    pub fn run(&mut self, rx: &Receiver<FsEvent>, shutdown: &ShutdownFlag) -> MonitorReport {
        self.state = MonitorState::Watching;

        loop {
            if is_shutdown_requested(shutdown) {
                println!("{}", "~~ Stopping...".yellow());
                break;
            }

            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    self.handle(&event);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("Event queue closed");
                    break;
                }
            }
        }

        self.state = MonitorState::Stopped;
        self.report.clone()
    }

    /// Handle one event. Returns whether it triggered a sync cycle.
    pub fn handle(&mut self, event: &FsEvent) -> bool {
        if !is_eligible(event) {
            tracing::trace!(path = %event.path.display(), "Ignoring event");
            return false;
        }

        self.state = MonitorState::Triggering;
        self.report.invocations += 1;
        println!(
            "{}",
            format!(
                "~~ Sync {} at {}",
                self.report.invocations,
                Local::now().format("%Y-%m-%d %H:%M:%S%.6f")
            )
            .cyan()
        );
        tracing::debug!(path = %event.path.display(), "Change detected");

        for target in self.targets {
            let invocation = compose(target, self.ctx);
            match self.transfer.run(&invocation) {
                Ok(output) => print!("{}", output),
                Err(e) => {
                    tracing::error!(entry = %target.entry, error = %e, "Sync failed");
                    self.report.failures += 1;
                }
            }
        }

        self.state = MonitorState::Watching;
        true
    }
}

/// Refuse targets that cannot be monitored.
pub fn check_monitorable(targets: &[SyncTarget]) -> Result<(), SyncError> {
    match targets.iter().find(|t| t.gather) {
        Some(t) => Err(SyncError::GatherMonitorConflict(t.entry.clone())),
        None => Ok(()),
    }
}

/// Watch the first target's source folder and sync all targets on every
/// eligible change until interrupted.
///
/// Signal handlers are in place before the subscription starts.
pub fn watch_and_sync<T: Transfer>(
    targets: &[SyncTarget],
    ctx: &RunContext,
    transfer: &T,
) -> Result<MonitorReport, SyncError> {
    check_monitorable(targets)?;
    let shutdown = signals::setup_signal_handlers();
    watch_and_sync_until(targets, ctx, transfer, &shutdown)
}

/// Same as [`watch_and_sync`], stopping when `shutdown` is set.
pub fn watch_and_sync_until<T: Transfer>(
    targets: &[SyncTarget],
    ctx: &RunContext,
    transfer: &T,
    shutdown: &ShutdownFlag,
) -> Result<MonitorReport, SyncError> {
    check_monitorable(targets)?;
    let Some(first) = targets.first() else {
        return Ok(MonitorReport::default());
    };

    if targets.len() > 1 && ctx.verbose {
        tracing::warn!(
            "Only the source folder of {} is watched; changes there trigger all {} entries",
            first.entry,
            targets.len()
        );
    }

    let root = first.watch_root(ctx);
    let (tx, rx) = mpsc::channel();

    let watcher = DirectoryWatcher::subscribe(&root, move |event| {
        let _ = tx.send(event);
    })
    .map_err(|source| SyncError::Watch {
        path: root.clone(),
        source,
    })?;

    let mut monitor = MonitorLoop::new(targets, ctx, transfer);
    let report = monitor.run(&rx, shutdown);

    watcher.unsubscribe();
    Ok(report)
}
