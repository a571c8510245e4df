//! Target platforms and per-platform command pairs.
//!
//! Every action resolves to a [`CommandPair`]: one [`CommandPlan`] for iOS and
//! one for Android. Callers pick the plan for the platform they target with
//! [`CommandPair::select`], or validate an externally supplied platform name
//! with [`CommandPair::select_named`].
//!
//! # Example
//!
//! ```
//! use twinsim_core::platform::{CommandPair, CommandPlan, Platform};
//!
//! let pair = CommandPair::new(
//!     CommandPlan::single("idb ui key 4"),
//!     CommandPlan::single("adb shell input keyevent 4"),
//! );
//!
//! assert_eq!(pair.select(Platform::Android).to_shell(), "adb shell input keyevent 4");
//! assert!(pair.select_named("windows").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating a platform identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The identifier is neither `ios` nor `android`.
    #[error("Unknown platform '{0}' (expected 'ios' or 'android')")]
    Unknown(String),
}

/// The device platforms an action can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// An iOS Simulator driven through `xcrun simctl` and `idb`.
    Ios,
    /// An Android emulator or device driven through `adb` and `emulator`.
    Android,
}

impl Platform {
    /// Both platforms, in declaration order.
    pub const ALL: [Platform; 2] = [Platform::Ios, Platform::Android];

    /// The lowercase identifier used in configuration and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            _ => Err(PlatformError::Unknown(s.to_string())),
        }
    }
}

/// An ordered, non-empty sequence of shell commands for one platform.
///
/// Most actions need a single command. Composite actions (booting an iOS
/// simulator, for instance) are expressed as several steps that the executor
/// runs one at a time, stopping at the first failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPlan")]
pub struct CommandPlan {
    steps: Vec<String>,
}

#[derive(Deserialize)]
struct RawPlan {
    steps: Vec<String>,
}

impl TryFrom<RawPlan> for CommandPlan {
    type Error = String;

    fn try_from(raw: RawPlan) -> Result<Self, Self::Error> {
        CommandPlan::sequence(raw.steps)
            .ok_or_else(|| "command plan needs at least one non-blank step".to_string())
    }
}

impl CommandPlan {
    /// A plan consisting of exactly one command.
    pub fn single(command: impl Into<String>) -> Self {
        Self {
            steps: vec![command.into()],
        }
    }

    /// A plan of sequential steps.
    ///
    /// Returns `None` when `steps` is empty or any step is blank.
    pub fn sequence<I, S>(steps: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps: Vec<String> = steps.into_iter().map(Into::into).collect();
        if steps.is_empty() || steps.iter().any(|s| s.trim().is_empty()) {
            return None;
        }
        Some(Self { steps })
    }

    /// Builds a plan from steps the caller knows to be non-empty.
    pub(crate) fn chain(steps: Vec<String>) -> Self {
        debug_assert!(!steps.is_empty());
        Self { steps }
    }

    /// The individual commands, in execution order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Number of steps in the plan.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false` for plans built through the public constructors.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Renders the plan as one `&&`-chained shell string.
    ///
    /// Used for logging and dry runs; execution goes step by step.
    pub fn to_shell(&self) -> String {
        self.steps.join(" && ")
    }
}

impl fmt::Display for CommandPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell())
    }
}

/// The resolved commands of one action invocation, one plan per platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPair {
    pub ios: CommandPlan,
    pub android: CommandPlan,
}

impl CommandPair {
    pub fn new(ios: CommandPlan, android: CommandPlan) -> Self {
        Self { ios, android }
    }

    /// Returns the plan for `platform`.
    pub fn select(&self, platform: Platform) -> &CommandPlan {
        match platform {
            Platform::Ios => &self.ios,
            Platform::Android => &self.android,
        }
    }

    /// Consumes the pair, keeping only the plan for `platform`.
    pub fn into_plan(self, platform: Platform) -> CommandPlan {
        match platform {
            Platform::Ios => self.ios,
            Platform::Android => self.android,
        }
    }

    /// Validates `name` as a platform identifier, then selects its plan.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::Unknown`] if `name` is not `ios` or `android`
    pub fn select_named(&self, name: &str) -> Result<&CommandPlan, PlatformError> {
        let platform: Platform = name.parse()?;
        Ok(self.select(platform))
    }
}
