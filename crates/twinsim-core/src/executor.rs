//! Subprocess execution of resolved commands.
//!
//! The [`ShellRunner`] trait is the seam between command resolution and the
//! host: [`ShellExecutor`] runs each command through `sh -c`, while tests plug
//! in scripted runners. [`run_plan`] drives a [`CommandPlan`] step by step and
//! stops at the first failing step.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use twinsim_core::executor::{ShellExecutor, ShellRunner};
//!
//! # async fn example() -> Result<(), twinsim_core::executor::ExecutionError> {
//! let executor = ShellExecutor::new().with_timeout(Some(Duration::from_secs(5)));
//! let out = executor.run("adb devices", &CancellationToken::new()).await?;
//! println!("{out}");
//! # Ok(())
//! # }
//! ```

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::TwinsimConfig;
use crate::platform::CommandPlan;

/// Exit status the POSIX shell reports when a command cannot be found.
const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The command ran and exited unsuccessfully.
    #[error("Command '{command}' exited with {}: {stderr}", describe_exit(.code))]
    NonZeroExit {
        command: String,
        /// Exit code, or `None` if the process was killed by a signal.
        code: Option<i32>,
        /// The tool's diagnostic output.
        stderr: String,
    },

    /// The shell or the invoked tool is not installed.
    #[error("Tool not found for command '{command}': {detail}")]
    ToolNotFound { command: String, detail: String },

    /// The command exceeded its deadline and was killed.
    #[error("Command '{command}' timed out after {}ms", .after.as_millis())]
    Timeout { command: String, after: Duration },

    /// The command was cancelled and killed.
    #[error("Command '{command}' was cancelled")]
    Cancelled { command: String },

    /// One step of a multi-step plan failed; later steps were skipped.
    #[error("Step {step} of {total} failed: {source}")]
    StepFailed {
        /// 1-based index of the failing step.
        step: usize,
        total: usize,
        command: String,
        #[source]
        source: Box<ExecutionError>,
    },

    /// An I/O error occurred while spawning or waiting on the process.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl ExecutionError {
    /// The innermost error, looking through [`ExecutionError::StepFailed`].
    pub fn root(&self) -> &ExecutionError {
        match self {
            ExecutionError::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Runs one shell command and returns its trimmed stdout.
#[async_trait]
pub trait ShellRunner: Send + Sync {
    /// Runs `command` to completion.
    ///
    /// Implementations must stop waiting and return
    /// [`ExecutionError::Cancelled`] once `cancel` fires.
    async fn run(&self, command: &str, cancel: &CancellationToken) -> Result<String, ExecutionError>;
}

/// Runs every step of `plan` in order, stopping at the first failure.
///
/// Returns the non-empty outputs of all steps joined by newlines. For plans
/// with more than one step a failure is wrapped in
/// [`ExecutionError::StepFailed`] naming the step.
pub async fn run_plan(
    runner: &dyn ShellRunner,
    plan: &CommandPlan,
    cancel: &CancellationToken,
) -> Result<String, ExecutionError> {
    let total = plan.len();
    let mut outputs = Vec::with_capacity(total);

    for (index, step) in plan.steps().iter().enumerate() {
        match runner.run(step, cancel).await {
            Ok(out) => {
                if !out.is_empty() {
                    outputs.push(out);
                }
            }
            Err(e) if total > 1 => {
                warn!(step = index + 1, total, command = %step, error = %e, "plan step failed");
                return Err(ExecutionError::StepFailed {
                    step: index + 1,
                    total,
                    command: step.clone(),
                    source: Box::new(e),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(outputs.join("\n"))
}

/// Runs commands through the host shell as `tokio` subprocesses.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: PathBuf,
    timeout: Option<Duration>,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            shell: PathBuf::from("/bin/sh"),
            timeout: TwinsimConfig::default().command_timeout(),
        }
    }
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an executor with the deadline from `config`.
    pub fn from_config(config: &TwinsimConfig) -> Self {
        Self::default().with_timeout(config.command_timeout())
    }

    /// Sets the per-command deadline. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses a different shell binary (invoked as `<shell> -c <command>`).
    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl ShellRunner for ShellExecutor {
    async fn run(&self, command: &str, cancel: &CancellationToken) -> Result<String, ExecutionError> {
        let started = Instant::now();
        debug!(command, "spawning");

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group, so a timeout or cancel reaches every pipeline member.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExecutionError::ToolNotFound {
                command: command.to_string(),
                detail: format!("shell {} not found", self.shell.display()),
            },
            _ => ExecutionError::Io(e),
        })?;
        let mut group = ProcessGroupGuard::new(child.id());

        // Dropping the wait future drops the child, which kills the shell;
        // dropping `group` then kills whatever the shell started.
        let wait = child.wait_with_output();
        let bounded = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, wait).await {
                    Ok(result) => result.map_err(ExecutionError::Io),
                    Err(_) => Err(ExecutionError::Timeout {
                        command: command.to_string(),
                        after: limit,
                    }),
                },
                None => wait.await.map_err(ExecutionError::Io),
            }
        };

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ExecutionError::Cancelled {
                command: command.to_string(),
            }),
            result = bounded => result,
        }?;
        // The shell exited on its own; backgrounded members stay running.
        group.release();

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if output.status.success() {
            debug!(command, elapsed_ms, "finished");
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let diagnostic = if stderr.is_empty() { stdout } else { stderr };
        let code = output.status.code();
        debug!(command, elapsed_ms, ?code, "failed");

        if code == Some(EXIT_COMMAND_NOT_FOUND) {
            return Err(ExecutionError::ToolNotFound {
                command: command.to_string(),
                detail: diagnostic,
            });
        }

        Err(ExecutionError::NonZeroExit {
            command: command.to_string(),
            code,
            stderr: diagnostic,
        })
    }
}

/// Kills a child's process group on drop unless released first.
///
/// `sh -c` runs pipelines as children of the shell, so killing the shell
/// alone leaves them orphaned.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn release(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            if let Some(pgid) = self.pgid.take() {
                if let Err(e) = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
                    debug!(pgid, error = %e, "process group already gone");
                }
            }
        }
    }
}
