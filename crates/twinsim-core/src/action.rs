//! The fixed vocabulary of device actions.
//!
//! [`Action`] carries the typed parameters of one invocation; [`ActionKind`]
//! names the action without parameters and knows how its output is shaped.
//!
//! # Example
//!
//! ```
//! use twinsim_core::action::{Action, ActionKind};
//! use twinsim_core::normalize::ResultShape;
//! use twinsim_core::platform::Platform;
//!
//! let action = Action::IsAppInstalled { app_id: "com.example.app".to_string() };
//! assert_eq!(action.kind(), ActionKind::IsAppInstalled);
//! assert_eq!(action.kind().name(), "isAppInstalled");
//! assert_eq!(action.kind().shape(Platform::Ios), ResultShape::Boolean);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::{Delimiter, ResultShape};
use crate::platform::Platform;

/// Errors raised while validating action parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// A parameter failed validation before any command was built.
    #[error("Invalid argument for {action}: {reason}")]
    InvalidArgument {
        action: ActionKind,
        reason: String,
    },

    /// No action is registered under this name.
    #[error("Unknown action '{0}'")]
    UnknownAction(String),
}

/// One device action with its parameters.
///
/// Serialized as JSON with an `action` tag, matching [`ActionKind::name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Capture the screen into a PNG file on the host.
    Screenshot {
        path: String,
    },

    /// Force-stop an app.
    #[serde(rename_all = "camelCase")]
    TerminateApp {
        app_id: String,
    },

    /// Launch an app.
    #[serde(rename_all = "camelCase")]
    StartApp {
        app_id: String,
    },

    /// Synthetic tap at screen coordinates.
    Tap {
        x: u32,
        y: u32,
    },

    /// Type free text into the focused field.
    Input {
        text: String,
    },

    /// Identifier of the first booted simulator or emulator, or empty.
    GetOpenSimulatorId,

    /// Whether the target is booted.
    IsSimulatorBooted {
        id: String,
    },

    /// Boot a simulator (iOS) or start an AVD in the background (Android).
    BootSimulator {
        id: String,
    },

    /// Attach the control session to a simulator. No-op on Android.
    ConnectSimulator {
        id: String,
    },

    /// Simulators and emulators that are currently shut down.
    GetAvailableSimulators,

    /// Whether an app with a matching identifier is installed.
    #[serde(rename_all = "camelCase")]
    IsAppInstalled {
        app_id: String,
    },

    /// Inject a key event by platform key code.
    PressKey {
        code: u32,
    },
}

/// The parameterless name of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Screenshot,
    TerminateApp,
    StartApp,
    Tap,
    Input,
    GetOpenSimulatorId,
    IsSimulatorBooted,
    BootSimulator,
    ConnectSimulator,
    GetAvailableSimulators,
    IsAppInstalled,
    PressKey,
}

impl ActionKind {
    /// Every registered action.
    pub const ALL: [ActionKind; 12] = [
        ActionKind::Screenshot,
        ActionKind::TerminateApp,
        ActionKind::StartApp,
        ActionKind::Tap,
        ActionKind::Input,
        ActionKind::GetOpenSimulatorId,
        ActionKind::IsSimulatorBooted,
        ActionKind::BootSimulator,
        ActionKind::ConnectSimulator,
        ActionKind::GetAvailableSimulators,
        ActionKind::IsAppInstalled,
        ActionKind::PressKey,
    ];

    /// The action's public name.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Screenshot => "screenshot",
            ActionKind::TerminateApp => "terminateApp",
            ActionKind::StartApp => "startApp",
            ActionKind::Tap => "tap",
            ActionKind::Input => "input",
            ActionKind::GetOpenSimulatorId => "getOpenSimulatorId",
            ActionKind::IsSimulatorBooted => "isSimulatorBooted",
            ActionKind::BootSimulator => "bootSimulator",
            ActionKind::ConnectSimulator => "connectSimulator",
            ActionKind::GetAvailableSimulators => "getAvailableSimulators",
            ActionKind::IsAppInstalled => "isAppInstalled",
            ActionKind::PressKey => "pressKey",
        }
    }

    /// How the output of this action is interpreted on `platform`.
    ///
    /// Only `getAvailableSimulators` differs per platform: iOS lists one
    /// simulator per line, Android joins AVD names with commas.
    pub fn shape(&self, platform: Platform) -> ResultShape {
        match self {
            ActionKind::IsSimulatorBooted | ActionKind::IsAppInstalled => ResultShape::Boolean,
            ActionKind::GetAvailableSimulators => match platform {
                Platform::Ios => ResultShape::List(Delimiter::Newline),
                Platform::Android => ResultShape::List(Delimiter::Comma),
            },
            _ => ResultShape::Text,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ActionError::UnknownAction(s.to_string()))
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Screenshot { .. } => ActionKind::Screenshot,
            Action::TerminateApp { .. } => ActionKind::TerminateApp,
            Action::StartApp { .. } => ActionKind::StartApp,
            Action::Tap { .. } => ActionKind::Tap,
            Action::Input { .. } => ActionKind::Input,
            Action::GetOpenSimulatorId => ActionKind::GetOpenSimulatorId,
            Action::IsSimulatorBooted { .. } => ActionKind::IsSimulatorBooted,
            Action::BootSimulator { .. } => ActionKind::BootSimulator,
            Action::ConnectSimulator { .. } => ActionKind::ConnectSimulator,
            Action::GetAvailableSimulators => ActionKind::GetAvailableSimulators,
            Action::IsAppInstalled { .. } => ActionKind::IsAppInstalled,
            Action::PressKey { .. } => ActionKind::PressKey,
        }
    }

    /// Checks parameters that the type system cannot.
    ///
    /// Paths, app identifiers and simulator identifiers must be non-blank.
    /// Free text for [`Action::Input`] may be empty but must not contain
    /// control characters, which no platform can type and which would end
    /// the command line on the Android device shell.
    pub fn validate(&self) -> Result<(), ActionError> {
        let kind = self.kind();
        let require = |field: &str, value: &str| {
            if value.trim().is_empty() {
                Err(ActionError::InvalidArgument {
                    action: kind,
                    reason: format!("{field} must not be empty"),
                })
            } else {
                Ok(())
            }
        };

        match self {
            Action::Screenshot { path } => require("path", path),
            Action::TerminateApp { app_id }
            | Action::StartApp { app_id }
            | Action::IsAppInstalled { app_id } => require("appId", app_id),
            Action::IsSimulatorBooted { id }
            | Action::BootSimulator { id }
            | Action::ConnectSimulator { id } => require("id", id),
            Action::Input { text } if text.chars().any(char::is_control) => {
                Err(ActionError::InvalidArgument {
                    action: kind,
                    reason: "text must not contain control characters".to_string(),
                })
            }
            Action::Tap { .. }
            | Action::Input { .. }
            | Action::GetOpenSimulatorId
            | Action::GetAvailableSimulators
            | Action::PressKey { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip_through_from_str() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.name().parse::<ActionKind>().unwrap(), kind);
        }
        assert!(matches!(
            "swipe".parse::<ActionKind>(),
            Err(ActionError::UnknownAction(name)) if name == "swipe"
        ));
    }

    #[test]
    fn serde_tag_matches_kind_name() {
        let action = Action::TerminateApp {
            app_id: "com.example".to_string(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "terminateApp");
        assert_eq!(json["appId"], "com.example");

        let parsed: Action =
            serde_json::from_str(r#"{"action":"tap","x":10,"y":20}"#).unwrap();
        assert_eq!(parsed, Action::Tap { x: 10, y: 20 });

        let parsed: Action = serde_json::from_str(r#"{"action":"getOpenSimulatorId"}"#).unwrap();
        assert_eq!(parsed.kind(), ActionKind::GetOpenSimulatorId);
    }

    #[test]
    fn serde_kind_matches_name() {
        for kind in ActionKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn shapes() {
        assert_eq!(ActionKind::IsSimulatorBooted.shape(Platform::Android), ResultShape::Boolean);
        assert_eq!(ActionKind::IsAppInstalled.shape(Platform::Ios), ResultShape::Boolean);
        assert_eq!(
            ActionKind::GetAvailableSimulators.shape(Platform::Ios),
            ResultShape::List(Delimiter::Newline)
        );
        assert_eq!(
            ActionKind::GetAvailableSimulators.shape(Platform::Android),
            ResultShape::List(Delimiter::Comma)
        );
        assert_eq!(ActionKind::GetOpenSimulatorId.shape(Platform::Ios), ResultShape::Text);
        assert_eq!(ActionKind::BootSimulator.shape(Platform::Android), ResultShape::Text);
    }

    #[test]
    fn validate_rejects_blank_identifiers() {
        let err = Action::Screenshot { path: "".into() }.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument for screenshot: path must not be empty"
        );

        assert!(Action::StartApp { app_id: "  ".into() }.validate().is_err());
        assert!(Action::BootSimulator { id: "".into() }.validate().is_err());
        assert!(Action::IsAppInstalled { app_id: "".into() }.validate().is_err());
    }

    #[test]
    fn validate_accepts_free_text() {
        assert!(Action::Input { text: "".into() }.validate().is_ok());
        assert!(Action::Input { text: "a \"b\" 'c'".into() }.validate().is_ok());
        assert!(Action::Tap { x: 0, y: 0 }.validate().is_ok());
        assert!(Action::PressKey { code: 4 }.validate().is_ok());
        assert!(Action::Input { text: "{a,b} $(id) ünï".into() }.validate().is_ok());
    }

    #[test]
    fn validate_rejects_control_characters_in_text() {
        for text in ["hi\ntouch /tmp/x", "a\tb", "a\rb", "\u{1b}[2J"] {
            let err = Action::Input { text: text.into() }.validate().unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid argument for input: text must not contain control characters",
                "{text:?}"
            );
        }
    }
}
