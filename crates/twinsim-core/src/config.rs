//! Persistent configuration for twinsim.
//!
//! Stores tool locations and the command deadline in
//! `~/.twinsim/config.json`. Every field is optional in the file; anything
//! missing falls back to the defaults below.
//!
//! # Example
//!
//! ```no_run
//! use twinsim_core::config::TwinsimConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = TwinsimConfig::load();
//! println!("adb: {}", config.tools.adb);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const CONFIG_DIRNAME: &str = ".twinsim";
const CONFIG_FILENAME: &str = "config.json";

/// Default deadline for a single command step.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 60_000;

/// Returns the twinsim directory, `~/.twinsim`.
pub fn twinsim_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_DIRNAME)
}

/// Returns the config file path, `~/.twinsim/config.json`.
pub fn config_path() -> PathBuf {
    twinsim_dir().join(CONFIG_FILENAME)
}

/// Executables invoked by the catalog.
///
/// Values are substituted verbatim at the head of each command, so they may be
/// bare names resolved through `PATH` or absolute paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// Xcode command runner (`xcrun simctl ...`).
    pub xcrun: String,
    /// iOS Development Bridge client.
    pub idb: String,
    /// Keystroke injection helper used for iOS text input.
    pub cliclick: String,
    /// macOS `open`, used to bring up the Simulator viewer.
    pub open: String,
    /// Android Debug Bridge.
    pub adb: String,
    /// Android emulator binary.
    pub emulator: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            xcrun: "xcrun".to_string(),
            idb: "idb".to_string(),
            cliclick: "cliclick".to_string(),
            open: "open".to_string(),
            adb: "adb".to_string(),
            emulator: default_emulator_path(),
        }
    }
}

/// Locates the Android emulator binary.
///
/// Checks `ANDROID_HOME`, then `ANDROID_SDK_ROOT`, then the Android Studio
/// default SDK location on macOS, and finally falls back to `emulator` on
/// `PATH`.
fn default_emulator_path() -> String {
    let sdk_roots = ["ANDROID_HOME", "ANDROID_SDK_ROOT"]
        .into_iter()
        .filter_map(|var| std::env::var_os(var).map(PathBuf::from));

    for root in sdk_roots {
        let candidate = root.join("emulator").join("emulator");
        if candidate.exists() {
            return candidate.to_string_lossy().into_owned();
        }
    }

    if let Some(home) = dirs::home_dir() {
        let candidate = home.join("Library/Android/sdk/emulator/emulator");
        if candidate.exists() {
            return candidate.to_string_lossy().into_owned();
        }
    }

    "emulator".to_string()
}

/// Persistent twinsim configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwinsimConfig {
    #[serde(default)]
    pub tools: ToolPaths,

    /// Per-step deadline in milliseconds. `None` disables the deadline.
    #[serde(default = "default_timeout_ms")]
    pub command_timeout_ms: Option<u64>,
}

fn default_timeout_ms() -> Option<u64> {
    Some(DEFAULT_COMMAND_TIMEOUT_MS)
}

impl Default for TwinsimConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            command_timeout_ms: default_timeout_ms(),
        }
    }
}

impl TwinsimConfig {
    /// Load config from `~/.twinsim/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load config from `path`, falling back to [`Default`] like [`load`](Self::load).
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.twinsim/config.json`, creating the directory.
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&config_path())
    }

    /// Save config to `path`, creating its parent directory.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// The configured per-step deadline.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms.map(Duration::from_millis)
    }
}
