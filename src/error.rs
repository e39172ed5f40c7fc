//! Unified error types for the fish feeder firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! polling loop and the console adapter report failures uniformly.
//! All variants are `Copy`; rejecting an operation never allocates.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
///
/// None of these are fatal: the rejected operation leaves prior state
/// unchanged and the caller decides how to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Entry id outside 1..=4, or hour/minute out of range.
    InvalidSchedule,
    /// Day/month/year combination does not exist, or year outside 2000..=2099.
    InvalidDate,
    /// Feed requested while the actuator is already running.
    AlreadyFeeding,
    /// Stop requested while the actuator is idle.
    NotFeeding,
    /// The RTC did not answer on the bus.
    ClockUnavailable,
    /// A console line could not be parsed.
    Command(CommandError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSchedule => write!(f, "invalid schedule"),
            Self::InvalidDate => write!(f, "invalid date"),
            Self::AlreadyFeeding => write!(f, "already feeding"),
            Self::NotFeeding => write!(f, "not feeding"),
            Self::ClockUnavailable => write!(f, "clock unavailable"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Console command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// First word is not a known command.
    Unknown,
    /// Known command, wrong arguments.
    Usage(&'static str),
    /// Entry number is not 1..=4.
    InvalidEntry,
    /// Time argument is not `HH:MM`.
    InvalidTimeFormat,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown command, type 'help'"),
            Self::Usage(usage) => write!(f, "usage: {usage}"),
            Self::InvalidEntry => write!(f, "entry must be 1-4"),
            Self::InvalidTimeFormat => write!(f, "time must be HH:MM"),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for CommandError {}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;
