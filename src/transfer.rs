//! Running the transfer tool
//!
//! rsync is an external collaborator: it receives the composed flags plus
//! the source and destination, and its output is handed back to the caller.

use std::process::Command;

use crate::command::TransferInvocation;
use crate::error::SyncError;

/// Program used when none is configured
pub const DEFAULT_PROGRAM: &str = "rsync";

/// Something that can carry out a composed transfer
pub trait Transfer {
    /// Run one transfer and return its combined output.
    fn run(&self, invocation: &TransferInvocation) -> Result<String, SyncError>;
}

/// Runs rsync (or a compatible program) as a subprocess
#[derive(Debug, Clone)]
pub struct Rsync {
    program: String,
}

impl Default for Rsync {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Rsync {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Transfer for Rsync {
    fn run(&self, invocation: &TransferInvocation) -> Result<String, SyncError> {
        tracing::debug!(
            entry = %invocation.entry,
            program = %self.program,
            "Running {} -> {}",
            invocation.source,
            invocation.destination
        );

        let output = Command::new(&self.program)
            .args(invocation.argv())
            .current_dir(&invocation.working_dir)
            .output()
            .map_err(|e| SyncError::TransferToolError {
                entry: invocation.entry.clone(),
                status: format!("could not start {}", self.program),
                output: e.to_string(),
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(SyncError::TransferToolError {
                entry: invocation.entry.clone(),
                status: output.status.to_string(),
                output: text,
            });
        }

        Ok(text)
    }
}
