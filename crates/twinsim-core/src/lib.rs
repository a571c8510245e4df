//! # twinsim-core
//!
//! Platform-agnostic device automation for iOS Simulators and Android
//! emulators.
//!
//! Every action (tap, text input, screenshot, app and simulator lifecycle,
//! install and boot-state queries) is resolved to a platform-specific shell
//! command, run as a subprocess, and its output is normalized into text, a
//! boolean or a list. Callers never branch on platform themselves.
//!
//! ## Modules
//!
//! - [`platform`] - [`Platform`](platform::Platform), command plans and pairs
//! - [`action`] - The action vocabulary and result shapes
//! - [`catalog`] - Static mapping from actions to per-platform commands
//! - [`quote`] - Shell escaping for untrusted parameters
//! - [`executor`] - Subprocess execution with deadline and cancellation
//! - [`normalize`] - Output interpretation
//! - [`device`] - The facade tying the above together
//! - [`config`] - Persistent tool paths and timeout
//!
//! ## External Dependencies
//!
//! The host needs the platform tools on `PATH` (or configured in
//! `~/.twinsim/config.json`):
//!
//! - **iOS**: Xcode (`xcrun simctl`), `idb`, `cliclick`
//! - **Android**: Android SDK platform tools (`adb`) and `emulator`
//!
//! ## Example
//!
//! ```no_run
//! use twinsim_core::{Device, Platform};
//!
//! # async fn example() -> Result<(), twinsim_core::Error> {
//! let device = Device::from_config(&twinsim_core::config::TwinsimConfig::load());
//! let udid = device.get_open_simulator_id(Platform::Ios).await?;
//! println!("booted: {udid}");
//! device.press_key(4, Platform::Android).await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod catalog;
pub mod config;
pub mod device;
pub mod error;
pub mod executor;
pub mod normalize;
pub mod platform;
pub mod quote;

pub use device::Device;
pub use error::Error;
pub use platform::Platform;
