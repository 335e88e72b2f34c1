// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy of the composer.

use hwcomposer_core::display::DisplayId;
use hwcomposer_core::hal;

/// Result alias for composer operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors returned by composer operations.
///
/// Every error is logged where it is created; callers need not log again.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The display identity is not known to the registry.
    #[error("invalid display {0}")]
    InvalidDisplay(DisplayId),
    /// A device call failed.
    #[error("{op} failed on display {display}: {error}")]
    Device {
        /// Name of the failing operation.
        op: &'static str,
        /// Display the operation targeted.
        display: DisplayId,
        /// Raw device error.
        #[source]
        error: hal::Error,
    },
    /// The device does not support the operation on this display.
    #[error("{op} is not supported on display {display}")]
    Unsupported {
        /// Name of the operation.
        op: &'static str,
        /// Display the operation targeted.
        display: DisplayId,
    },
    /// The device rejected a parameter.
    #[error("{op} rejected a parameter on display {display}")]
    BadValue {
        /// Name of the operation.
        op: &'static str,
        /// Display the operation targeted.
        display: DisplayId,
    },
    /// A virtual display was requested with a degenerate resolution.
    #[error("invalid virtual display resolution {width}x{height}")]
    InvalidResolution {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// A virtual display was requested above the configured maximum
    /// dimension.
    #[error("virtual display resolution {width}x{height} exceeds maximum dimension {max}")]
    ResolutionExceedsMax {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Configured maximum dimension.
        max: u32,
    },
    /// The device refused to create a virtual display.
    #[error("device refused to create a virtual display: {0}")]
    VirtualDisplayAllocation(#[source] hal::Error),
}

/// Coarse status for callers that only branch on the error class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The display is unknown.
    BadIndex,
    /// The device failed.
    UnknownError,
    /// The operation is not available on this display.
    InvalidOperation,
    /// A parameter was rejected.
    BadValue,
    /// A resource could not be allocated.
    NoMemory,
}

impl Error {
    /// Maps the error onto its coarse status.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidDisplay(_) => Status::BadIndex,
            Self::Device { .. } => Status::UnknownError,
            Self::Unsupported { .. } => Status::InvalidOperation,
            Self::BadValue { .. } | Self::InvalidResolution { .. } => Status::BadValue,
            Self::ResolutionExceedsMax { .. } | Self::VirtualDisplayAllocation(_) => {
                Status::NoMemory
            }
        }
    }

    /// Returns the raw device error, if this error came from the device.
    #[must_use]
    pub fn device_error(&self) -> Option<hal::Error> {
        match self {
            Self::Device { error, .. } | Self::VirtualDisplayAllocation(error) => Some(*error),
            Self::Unsupported { .. } => Some(hal::Error::Unsupported),
            Self::BadValue { .. } => Some(hal::Error::BadParameter),
            _ => None,
        }
    }
}

/// Logs and builds an invalid-display error.
pub(crate) fn invalid_display(id: DisplayId) -> Error {
    tracing::error!(display = %id, "invalid display");
    Error::InvalidDisplay(id)
}

/// Logs and builds a device error.
pub(crate) fn device(op: &'static str, id: DisplayId, error: hal::Error) -> Error {
    tracing::error!(display = %id, op, code = error.code(), %error, "device call failed");
    Error::Device {
        op,
        display: id,
        error,
    }
}

/// Like [`device`], but keeps unsupported and bad-parameter failures apart so
/// callers can adapt.
pub(crate) fn classified(op: &'static str, id: DisplayId, error: hal::Error) -> Error {
    tracing::error!(display = %id, op, code = error.code(), %error, "device call failed");
    match error {
        hal::Error::Unsupported => Error::Unsupported { op, display: id },
        hal::Error::BadParameter => Error::BadValue { op, display: id },
        error => Error::Device {
            op,
            display: id,
            error,
        },
    }
}
