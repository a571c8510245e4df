//! Shared test helpers for twinsim-core integration tests.
//!
//! Provides a scripted [`ShellRunner`] that replays canned replies and records
//! every command it was asked to run, so the device pipeline can be tested
//! without any platform tools installed.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use twinsim_core::catalog::Catalog;
use twinsim_core::config::ToolPaths;
use twinsim_core::executor::{ExecutionError, ShellRunner};
use twinsim_core::Device;

// ---------------------------------------------------------------------------
// Scripted runner
// ---------------------------------------------------------------------------

/// What the runner does for a matching command.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Succeed with this (already trimmed) stdout.
    Output(String),
    /// Exit with a non-zero status and stderr.
    Fail(i32, String),
    /// Never finish on its own; only cancellation ends it.
    Hang,
}

/// A [`ShellRunner`] driven by `(needle, reply)` rules.
///
/// The first rule whose needle is a substring of the command wins; commands
/// with no matching rule succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, Reply)>,
    ran: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, reply: Reply) -> Self {
        self.rules.push((needle.to_string(), reply));
        self
    }

    /// Every command run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.ran.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShellRunner for ScriptedRunner {
    async fn run(&self, command: &str, cancel: &CancellationToken) -> Result<String, ExecutionError> {
        self.ran.lock().unwrap().push(command.to_string());

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Reply::Output(String::new()));

        match reply {
            Reply::Output(out) => Ok(out),
            Reply::Fail(code, stderr) => Err(ExecutionError::NonZeroExit {
                command: command.to_string(),
                code: Some(code),
                stderr,
            }),
            Reply::Hang => {
                cancel.cancelled().await;
                Err(ExecutionError::Cancelled {
                    command: command.to_string(),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Device helpers
// ---------------------------------------------------------------------------

/// Tool paths with plain names, independent of the host's SDK layout.
pub fn plain_tools() -> ToolPaths {
    ToolPaths {
        xcrun: "xcrun".to_string(),
        idb: "idb".to_string(),
        cliclick: "cliclick".to_string(),
        open: "open".to_string(),
        adb: "adb".to_string(),
        emulator: "emulator".to_string(),
    }
}

/// A device backed by `runner`, plus a handle to inspect what it ran.
pub fn scripted_device(runner: ScriptedRunner) -> (Device, Arc<ScriptedRunner>) {
    let runner = Arc::new(runner);
    let device = Device::with_catalog(Arc::new(Catalog::new(plain_tools())), runner.clone());
    (device, runner)
}
