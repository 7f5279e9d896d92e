//! External process execution.
//!
//! Every tool in the pipeline is a black-box program whose standard output is
//! one result per line. `ProcessRunner` never fails: any problem is logged
//! and the invocation yields an empty sequence.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use recon_core::StderrPolicy;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs one external command and returns its stdout lines.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Execute `program` with `args`.
    ///
    /// Returns an empty sequence if the process cannot be started, exits
    /// unsuccessfully, is cancelled, or (depending on policy) writes to
    /// stderr.
    async fn run(&self, program: &str, args: &[String], cancel: &CancellationToken)
        -> Vec<String>;
}

/// Production runner backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    stderr_policy: StderrPolicy,
}

impl TokioProcessRunner {
    /// Create a runner with the given stderr policy.
    #[must_use]
    pub fn new(stderr_policy: StderrPolicy) -> Self {
        Self { stderr_policy }
    }

    async fn execute(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled {
                operation: program.to_string(),
            });
        }

        // Dropping the child (on cancellation) kills the process.
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScanError::ToolExecution {
                tool: program.to_string(),
                reason: format!("failed to start: {e}"),
            })?;

        let output = tokio::select! {
            output = child.wait_with_output() => output.map_err(|e| ScanError::ToolExecution {
                tool: program.to_string(),
                reason: format!("failed to collect output: {e}"),
            })?,
            () = cancel.cancelled() => {
                return Err(ScanError::Cancelled {
                    operation: program.to_string(),
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if !output.status.success() {
            return Err(ScanError::ToolExecution {
                tool: program.to_string(),
                reason: format!("exited with {}: {stderr}", output.status),
            });
        }

        if !stderr.is_empty() {
            match self.stderr_policy {
                StderrPolicy::Strict => {
                    return Err(ScanError::ToolExecution {
                        tool: program.to_string(),
                        reason: format!("wrote to stderr: {stderr}"),
                    });
                }
                StderrPolicy::Lenient => {
                    warn!("Command {} wrote to stderr: {}", program, stderr);
                }
            }
        }

        Ok(split_lines(&output.stdout))
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Vec<String> {
        let command_line = format!("{program} {}", args.join(" "));
        info!("Running command: {}", command_line);

        match self.execute(program, args, cancel).await {
            Ok(lines) => {
                info!("Command {} completed with {} lines", command_line, lines.len());
                lines
            }
            Err(e @ ScanError::Cancelled { .. }) => {
                warn!("Command {} not completed: {}", command_line, e);
                Vec::new()
            }
            Err(e) => {
                error!("Error running {}: {}", command_line, e);
                Vec::new()
            }
        }
    }
}

/// Split raw stdout into trimmed, non-blank lines.
pub(crate) fn split_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
