//! The action catalog: typed actions to per-platform shell commands.
//!
//! [`Catalog::resolve`] validates an [`Action`] and produces a [`CommandPair`]
//! holding a fully substituted [`CommandPlan`] for each platform. The catalog
//! holds no mutable state; [`Catalog::global`] is built once on first use and
//! shared by every caller.
//!
//! # Example
//!
//! ```
//! use twinsim_core::action::Action;
//! use twinsim_core::catalog::Catalog;
//! use twinsim_core::config::ToolPaths;
//! use twinsim_core::platform::Platform;
//!
//! let catalog = Catalog::new(ToolPaths::default());
//! let pair = catalog.resolve(&Action::PressKey { code: 4 }).unwrap();
//! assert_eq!(pair.select(Platform::Android).to_shell(), "adb shell input keyevent 4");
//! ```

use std::sync::{Arc, OnceLock};

use crate::action::{Action, ActionError};
use crate::config::{ToolPaths, TwinsimConfig};
use crate::platform::{CommandPair, CommandPlan};
use crate::quote::{adb_shell_quote, android_input_segments, ios_keystroke_literal, sh_quote};

static GLOBAL_CATALOG: OnceLock<Arc<Catalog>> = OnceLock::new();

/// Maps actions to command pairs for a fixed set of tool locations.
#[derive(Debug, Clone)]
pub struct Catalog {
    tools: ToolPaths,
}

impl Catalog {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    /// The process-wide catalog, built from the persisted configuration on
    /// first access.
    pub fn global() -> Arc<Catalog> {
        GLOBAL_CATALOG
            .get_or_init(|| Arc::new(Catalog::new(TwinsimConfig::load().tools)))
            .clone()
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Builds the command pair for `action`.
    ///
    /// # Errors
    ///
    /// - [`ActionError::InvalidArgument`] if a required parameter is blank
    pub fn resolve(&self, action: &Action) -> Result<CommandPair, ActionError> {
        action.validate()?;

        let xcrun = sh_quote(&self.tools.xcrun);
        let idb = sh_quote(&self.tools.idb);
        let adb = sh_quote(&self.tools.adb);
        let emulator = sh_quote(&self.tools.emulator);

        let pair = match action {
            Action::Screenshot { path } => {
                let path = sh_quote(path);
                CommandPair::new(
                    CommandPlan::single(format!("{xcrun} simctl io booted screenshot {path}")),
                    CommandPlan::single(format!("{adb} exec-out screencap -p > {path}")),
                )
            }
            Action::TerminateApp { app_id } => CommandPair::new(
                CommandPlan::single(format!("{idb} terminate {}", sh_quote(app_id))),
                CommandPlan::single(format!(
                    "{adb} shell am force-stop {}",
                    adb_shell_quote(app_id)
                )),
            ),
            Action::StartApp { app_id } => CommandPair::new(
                CommandPlan::single(format!("{idb} launch {}", sh_quote(app_id))),
                CommandPlan::single(format!(
                    "{adb} shell monkey -p {} -c android.intent.category.LAUNCHER 1",
                    adb_shell_quote(app_id)
                )),
            ),
            Action::Tap { x, y } => CommandPair::new(
                CommandPlan::single(format!("{idb} ui tap {x} {y}")),
                CommandPlan::single(format!("{adb} shell input tap {x} {y}")),
            ),
            Action::Input { text } => CommandPair::new(
                CommandPlan::chain(vec![
                    format!("{idb} focus"),
                    format!(
                        "{} t:{}",
                        sh_quote(&self.tools.cliclick),
                        ios_keystroke_literal(text)
                    ),
                ]),
                CommandPlan::chain(
                    android_input_segments(text)
                        .into_iter()
                        .map(|segment| format!("{adb} shell input text {segment}"))
                        .collect(),
                ),
            ),
            Action::GetOpenSimulatorId => CommandPair::new(
                CommandPlan::single(format!(
                    "{idb} list-targets | awk -F ' *[|] *' '$3 == \"Booted\" {{print $2; exit}}'"
                )),
                CommandPlan::single(format!(
                    "{adb} devices | awk 'NR > 1 && $1 ~ /^emulator-/ {{print $1; exit}}'"
                )),
            ),
            Action::IsSimulatorBooted { id } => CommandPair::new(
                CommandPlan::single(bool_condition(&format!(
                    "{idb} list-targets | grep -F -- {} | grep -q Booted",
                    sh_quote(id)
                ))),
                CommandPlan::single(bool_condition(&format!(
                    "{adb} shell getprop sys.boot_completed 2>/dev/null | tr -d '\\r' | grep -qx 1"
                ))),
            ),
            Action::BootSimulator { id } => {
                let id = sh_quote(id);
                CommandPair::new(
                    CommandPlan::chain(vec![
                        format!("{idb} kill"),
                        format!("{idb} boot {id}"),
                        format!("{idb} connect {id}"),
                        format!("{} -a Simulator", sh_quote(&self.tools.open)),
                    ]),
                    CommandPlan::single(format!(
                        "nohup {emulator} -avd {id} > /dev/null 2>&1 &"
                    )),
                )
            }
            Action::ConnectSimulator { id } => CommandPair::new(
                CommandPlan::chain(vec![
                    format!("{idb} kill"),
                    format!("{idb} connect {}", sh_quote(id)),
                ]),
                CommandPlan::single("echo true"),
            ),
            Action::GetAvailableSimulators => CommandPair::new(
                CommandPlan::single(format!(
                    "{idb} list-targets | awk -F ' *[|] *' '$3 == \"Shutdown\" {{print $1 \" (\" $2 \")\"}}'"
                )),
                CommandPlan::single(format!("{emulator} -list-avds | paste -sd, -")),
            ),
            Action::IsAppInstalled { app_id } => {
                let app_id = sh_quote(app_id);
                CommandPair::new(
                    CommandPlan::single(bool_condition(&format!(
                        "{idb} list-apps | grep -qF -- {app_id}"
                    ))),
                    CommandPlan::single(bool_condition(&format!(
                        "{adb} shell pm list packages | grep -qF -- {app_id}"
                    ))),
                )
            }
            Action::PressKey { code } => CommandPair::new(
                CommandPlan::single(format!("{idb} ui key {code}")),
                CommandPlan::single(format!("{adb} shell input keyevent {code}")),
            ),
        };

        Ok(pair)
    }
}

/// Wraps a condition so the command prints exactly `true` or `false`.
fn bool_condition(condition: &str) -> String {
    format!("if {condition}; then echo true; else echo false; fi")
}
