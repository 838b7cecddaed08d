//! Interrupt handling for monitor mode.
//!
//! The first SIGINT (Ctrl+C) or SIGTERM sets a shared shutdown flag that the
//! monitor loop checks between sync cycles; a cycle already running is
//! finished. A second interrupt exits the process immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use tracing::{error, info};

/// Shared shutdown flag checked by the monitor loop.
pub type ShutdownFlag = Arc<AtomicBool>;

/// Exit status used when a second interrupt forces the process down
const FORCED_EXIT_CODE: i32 = 130;

/// Create a new shutdown flag that nothing sets.
pub fn shutdown_flag() -> ShutdownFlag {
    Arc::new(AtomicBool::new(false))
}

/// Check whether the shutdown flag has been set.
pub fn is_shutdown_requested(flag: &ShutdownFlag) -> bool {
    flag.load(Ordering::SeqCst)
}

/// Request a shutdown through the flag.
pub fn request_shutdown(flag: &ShutdownFlag) {
    flag.store(true, Ordering::SeqCst);
}

/// Create a shutdown flag and register OS signal handlers for it.
///
/// Returns once the handlers are installed, so an interrupt arriving after
/// this call is always seen by the flag.
pub fn setup_signal_handlers() -> ShutdownFlag {
    let flag = shutdown_flag();
    let flag_clone = flag.clone();
    let (ready_tx, ready_rx) = mpsc::channel();

    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!(error = %e, "Failed to start signal listener");
                let _ = ready_tx.send(());
                return;
            }
        };

        runtime.block_on(async move {
            let mut interrupts = match Interrupts::install() {
                Ok(interrupts) => interrupts,
                Err(e) => {
                    error!(error = %e, "Failed to register signal handlers");
                    let _ = ready_tx.send(());
                    return;
                }
            };
            let _ = ready_tx.send(());

            interrupts.recv().await;
            info!("received interrupt, finishing current sync before shutdown");
            request_shutdown(&flag_clone);

            interrupts.recv().await;
            info!("received second interrupt, exiting");
            std::process::exit(FORCED_EXIT_CODE);
        });
    });

    // The sender is dropped without sending only if the thread died early.
    let _ = ready_rx.recv();
    flag
}

#[cfg(unix)]
struct Interrupts {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Interrupts {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigint.recv() => info!("received SIGINT (Ctrl+C)"),
            _ = self.sigterm.recv() => info!("received SIGTERM"),
        }
    }
}

#[cfg(not(unix))]
struct Interrupts {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl Interrupts {
    fn install() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) {
        self.ctrl_c.recv().await;
        info!("received Ctrl+C");
    }
}
