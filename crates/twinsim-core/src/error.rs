//! Crate-level error type.
//!
//! [`Error`] unifies the per-module errors so callers of
//! [`Device`](crate::device::Device) handle one type regardless of where a
//! failure happened.

use thiserror::Error;

use crate::action::ActionError;
use crate::executor::ExecutionError;
use crate::platform::PlatformError;

#[derive(Error, Debug)]
pub enum Error {
    /// The platform identifier was not recognized.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// An action parameter failed validation.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The command could not be run or exited unsuccessfully.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl Error {
    /// True for failures detected before anything was executed.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Platform(_) | Error::Action(_))
    }
}
