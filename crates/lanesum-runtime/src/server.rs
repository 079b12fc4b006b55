use crate::{BackTrace, Feature, storage::HandleId};
use thiserror::Error;

/// Kernel Launch Errors.
#[derive(Error, Clone)]
pub enum LaunchError {
    /// The device can't run the kernel.
    #[error("The device doesn't support the feature {feature:?} required by the kernel")]
    MissingFeature {
        /// The feature that isn't supported.
        feature: Feature,
    },

    /// Too many resources were requested
    #[error("Too many resources were requested during launch\n{0}")]
    TooManyResources(#[from] ResourceLimitError),

    /// A binding doesn't match what the kernel expects.
    #[error("Invalid binding provided during launch\nCaused by:\n  {reason}\nBacktrace\n{backtrace}")]
    InvalidBinding {
        /// Why the binding was rejected.
        reason: String,
        /// The backtrace for this error.
        backtrace: BackTrace,
    },

    /// The handle isn't owned by the client storage.
    #[error("The handle {id:?} isn't registered in the client storage\nBacktrace\n{backtrace}")]
    UnknownHandle {
        /// The unknown handle.
        id: HandleId,
        /// The backtrace for this error.
        backtrace: BackTrace,
    },
}

/// Resource limit errors.
#[derive(Error, Clone)]
pub enum ResourceLimitError {
    /// Total units exceeds maximum
    #[error(
        "Total unit count exceeds maximum.\nRequested {requested} units, max units is {max}.\nBacktrace\n{backtrace}"
    )]
    Units {
        /// Requested value
        requested: u32,
        /// Maximum value
        max: u32,
        /// The backtrace for this error.
        backtrace: BackTrace,
    },
    /// `CubeDim` exceeds maximum
    #[error(
        "Cube dim exceeds maximum bounds.\nRequested {requested:?}, max is {max:?}.\nBacktrace\n{backtrace}"
    )]
    CubeDim {
        /// Requested value
        requested: (u32, u32, u32),
        /// Maximum value
        max: (u32, u32, u32),
        /// The backtrace for this error.
        backtrace: BackTrace,
    },
    /// `CubeCount` exceeds maximum
    #[error(
        "Cube count exceeds maximum bounds.\nRequested {requested:?}, max is {max:?}.\nBacktrace\n{backtrace}"
    )]
    CubeCount {
        /// Requested value
        requested: (u32, u32, u32),
        /// Maximum value
        max: (u32, u32, u32),
        /// The backtrace for this error.
        backtrace: BackTrace,
    },
}

impl LaunchError {
    /// Create an [invalid binding](LaunchError::InvalidBinding) error.
    pub fn invalid_binding(reason: impl Into<String>) -> Self {
        Self::InvalidBinding {
            reason: reason.into(),
            backtrace: BackTrace::capture(),
        }
    }
}

impl core::fmt::Debug for LaunchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}

impl core::fmt::Debug for ResourceLimitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}
