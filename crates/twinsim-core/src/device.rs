//! Platform-agnostic entry point for device actions.
//!
//! [`Device`] resolves an action through the [`Catalog`], picks the plan for
//! the requested [`Platform`], runs it with a [`ShellRunner`] and normalizes
//! the output. Each operation is an independent async call; the only shared
//! state is the read-only catalog and the root cancellation token.
//!
//! # Example
//!
//! ```no_run
//! use twinsim_core::device::Device;
//! use twinsim_core::platform::Platform;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), twinsim_core::Error> {
//!     let device = Device::from_config(&twinsim_core::config::TwinsimConfig::load());
//!
//!     if !device.is_simulator_booted("A1B2C3D4", Platform::Ios).await? {
//!         device.boot_simulator("A1B2C3D4", Platform::Ios).await?;
//!     }
//!     device.tap(120, 340, Platform::Ios).await?;
//!     device.input("hello world", Platform::Android).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use crate::action::Action;
use crate::catalog::Catalog;
use crate::config::TwinsimConfig;
use crate::error::Error;
use crate::executor::{run_plan, ExecutionError, ShellExecutor, ShellRunner};
use crate::normalize::ActionOutput;
use crate::platform::{CommandPlan, Platform};

/// Issues device actions against either platform.
pub struct Device {
    catalog: Arc<Catalog>,
    runner: Arc<dyn ShellRunner>,
    cancel: CancellationToken,
}

impl Device {
    /// Creates a device using the process-wide catalog.
    pub fn new(runner: Arc<dyn ShellRunner>) -> Self {
        Self::with_catalog(Catalog::global(), runner)
    }

    pub fn with_catalog(catalog: Arc<Catalog>, runner: Arc<dyn ShellRunner>) -> Self {
        Self {
            catalog,
            runner,
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a device whose tools and deadline come from `config`.
    pub fn from_config(config: &TwinsimConfig) -> Self {
        Self::with_catalog(
            Arc::new(Catalog::new(config.tools.clone())),
            Arc::new(ShellExecutor::from_config(config)),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cancels every in-flight call, and every later call, on this device.
    ///
    /// Running subprocesses are killed and their calls fail with
    /// [`ExecutionError::Cancelled`](crate::executor::ExecutionError::Cancelled).
    pub fn cancel_all(&self) {
        self.cancel.cancel();
    }

    /// A token that is cancelled together with [`cancel_all`](Self::cancel_all).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolves `action` for `platform` without running anything.
    pub fn plan(&self, action: &Action, platform: Platform) -> Result<CommandPlan, Error> {
        Ok(self.catalog.resolve(action)?.into_plan(platform))
    }

    /// Like [`plan`](Self::plan) but validates a platform name first.
    pub fn plan_named(&self, action: &Action, platform: &str) -> Result<CommandPlan, Error> {
        self.plan(action, platform.parse()?)
    }

    /// Runs `action` on `platform` and normalizes its output.
    pub async fn execute(&self, action: &Action, platform: Platform) -> Result<ActionOutput, Error> {
        self.execute_with_cancel(action, platform, &self.cancel).await
    }

    /// Validates `platform` as a platform name, then runs `action`.
    ///
    /// For platform identifiers coming from configuration or other
    /// untyped sources.
    pub async fn execute_named(&self, action: &Action, platform: &str) -> Result<ActionOutput, Error> {
        let platform: Platform = platform.parse()?;
        self.execute(action, platform).await
    }

    /// Runs `action`, stopping early if `cancel` or the device's root token
    /// fires.
    pub async fn execute_with_cancel(
        &self,
        action: &Action,
        platform: Platform,
        cancel: &CancellationToken,
    ) -> Result<ActionOutput, Error> {
        let kind = action.kind();
        let span = info_span!("action", action = %kind, %platform);
        async {
            let start = Instant::now();
            let plan = self.plan(action, platform)?;
            debug!(command = %plan, steps = plan.len(), "resolved");

            // Dropping the run kills whichever subprocess is live.
            let token = self.cancel.child_token();
            let run = run_plan(self.runner.as_ref(), &plan, &token);
            let raw = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ExecutionError::Cancelled { command: plan.to_shell() }),
                result = run => result,
            }
            .inspect_err(|e| warn!(error = %e, "action failed"))?;

            let output = kind.shape(platform).normalize(&raw);
            debug!(elapsed_ms = start.elapsed().as_millis() as u64, ?output, "action complete");
            Ok::<_, Error>(output)
        }
        .instrument(span)
        .await
    }

    /// Captures the screen into `path` on the host.
    pub async fn screenshot(&self, path: &str, platform: Platform) -> Result<String, Error> {
        self.text(Action::Screenshot { path: path.to_string() }, platform).await
    }

    /// Force-stops `app_id`.
    pub async fn terminate_app(&self, app_id: &str, platform: Platform) -> Result<String, Error> {
        self.text(Action::TerminateApp { app_id: app_id.to_string() }, platform).await
    }

    /// Launches `app_id`.
    pub async fn start_app(&self, app_id: &str, platform: Platform) -> Result<String, Error> {
        self.text(Action::StartApp { app_id: app_id.to_string() }, platform).await
    }

    pub async fn tap(&self, x: u32, y: u32, platform: Platform) -> Result<String, Error> {
        self.text(Action::Tap { x, y }, platform).await
    }

    /// Types `text` into the focused field. Quotes and spaces are escaped per
    /// platform.
    pub async fn input(&self, text: &str, platform: Platform) -> Result<String, Error> {
        self.text(Action::Input { text: text.to_string() }, platform).await
    }

    /// Identifier of the first booted simulator or emulator; empty if none.
    pub async fn get_open_simulator_id(&self, platform: Platform) -> Result<String, Error> {
        self.text(Action::GetOpenSimulatorId, platform).await
    }

    /// `true` only if the tool answered exactly `true`.
    pub async fn is_simulator_booted(&self, id: &str, platform: Platform) -> Result<bool, Error> {
        let action = Action::IsSimulatorBooted { id: id.to_string() };
        Ok(self.execute(&action, platform).await?.into_bool())
    }

    /// Boots `id`. On iOS every step must succeed before the next runs; on
    /// Android the emulator is started in the background and the call returns
    /// without waiting for boot to finish.
    pub async fn boot_simulator(&self, id: &str, platform: Platform) -> Result<String, Error> {
        self.text(Action::BootSimulator { id: id.to_string() }, platform).await
    }

    /// Reattaches the iOS control session to `id`. Always succeeds on Android.
    pub async fn connect_simulator(&self, id: &str, platform: Platform) -> Result<String, Error> {
        self.text(Action::ConnectSimulator { id: id.to_string() }, platform).await
    }

    /// Shut-down simulators (`name (udid)`) or configured AVD names.
    pub async fn get_available_simulators(&self, platform: Platform) -> Result<Vec<String>, Error> {
        Ok(self
            .execute(&Action::GetAvailableSimulators, platform)
            .await?
            .into_list())
    }

    /// `true` only if the tool answered exactly `true`.
    pub async fn is_app_installed(&self, app_id: &str, platform: Platform) -> Result<bool, Error> {
        let action = Action::IsAppInstalled { app_id: app_id.to_string() };
        Ok(self.execute(&action, platform).await?.into_bool())
    }

    pub async fn press_key(&self, code: u32, platform: Platform) -> Result<String, Error> {
        self.text(Action::PressKey { code }, platform).await
    }

    async fn text(&self, action: Action, platform: Platform) -> Result<String, Error> {
        Ok(self.execute(&action, platform).await?.into_text())
    }
}
