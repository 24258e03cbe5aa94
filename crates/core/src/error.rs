//! Error types for open-x9-core.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Device absent, or the handle no longer refers to a usable device.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The platform refused a driver-state query, detach, or claim.
    #[error("permission denied: {0}. Try running with sudo or add a udev rule for your mouse")]
    PermissionDenied(String),

    /// A requested value is outside what the device accepts.
    #[error("unsupported {field}: {value} (allowed: {allowed})")]
    UnsupportedValue {
        field: &'static str,
        value: String,
        allowed: String,
    },

    /// Control transfer I/O failure.
    #[error("transfer failed: {0}")]
    Transport(String),

    /// Best-effort release failed; the interface may still be detached.
    #[error("failed to release device back to kernel: {0}")]
    Release(String),

    /// Operation called in a session state that does not permit it.
    #[error("invalid session state: {operation} not allowed while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl Error {
    /// Build an `UnsupportedValue` error.
    pub fn unsupported(
        field: &'static str,
        value: impl ToString,
        allowed: impl ToString,
    ) -> Self {
        Self::UnsupportedValue {
            field,
            value: value.to_string(),
            allowed: allowed.to_string(),
        }
    }

    /// Whether the error was raised by input validation, before any transfer.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnsupportedValue { .. })
    }
}

impl From<rusb::Error> for Error {
    fn from(err: rusb::Error) -> Self {
        match err {
            rusb::Error::Access => Self::PermissionDenied(err.to_string()),
            rusb::Error::NoDevice | rusb::Error::NotFound => Self::DeviceNotFound(err.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
