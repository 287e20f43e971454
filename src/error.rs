//! Unified error types for the interferometer driver.
//!
//! A single [`Error`] enum that every subsystem converts into, with
//! per-subsystem enums underneath.  All variants are `Copy` so they can be
//! passed through the service loop and event sinks without allocation.

use core::fmt;

use crate::acquisition::decoder::MeasurementOutcome;
use crate::metrics::MetricsSnapshot;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// An acquisition cycle did not produce a full-spin snapshot.
    Acquire(AcquireError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquire(e) => write!(f, "acquire: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Acquisition errors
// ---------------------------------------------------------------------------

/// Every way `measure()` can end without a full-spin snapshot.
///
/// `PartialSpin` is not a failure: it is the defined "incomplete" result
/// and carries the reduced-confidence snapshot so the caller can decide
/// whether to retry or proceed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcquireError {
    /// `initialize()` has not run yet.
    NotInitialized,
    /// The emergency latch is set.  Terminal until an authorised reboot.
    Halted,
    /// The device never reported settled within the configured bound.
    SettleTimeout { waited_us: u32 },
    /// Interference in the (0.4, 0.6) band; snapshot spin is 0.5.
    PartialSpin {
        snapshot: MetricsSnapshot,
        interference: f64,
    },
    /// Interference outside every recognised band.
    Measurement { interference: f64 },
}

impl AcquireError {
    /// Decoder outcome behind this error, if the cycle got as far as decoding.
    pub const fn outcome(&self) -> Option<MeasurementOutcome> {
        match self {
            Self::PartialSpin { .. } => Some(MeasurementOutcome::PartialSpinConfined),
            Self::Measurement { .. } => Some(MeasurementOutcome::MeasurementError),
            Self::NotInitialized | Self::Halted | Self::SettleTimeout { .. } => None,
        }
    }

    /// Whether another `measure()` on the same device may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Measurement { .. } | Self::SettleTimeout { .. })
    }
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "device not initialized"),
            Self::Halted => write!(f, "device halted by emergency latch"),
            Self::SettleTimeout { waited_us } => {
                write!(f, "settle timeout after {}us", waited_us)
            }
            Self::PartialSpin { interference, .. } => {
                write!(f, "partial spin confined (interference={:.4})", interference)
            }
            Self::Measurement { interference } => {
                write!(f, "measurement error (interference={:.4})", interference)
            }
        }
    }
}

impl std::error::Error for AcquireError {}

impl From<AcquireError> for Error {
    fn from(e: AcquireError) -> Self {
        Self::Acquire(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` names the field and the rule.
    ValidationFailed(&'static str),
    /// Serialized config could not be parsed.
    Parse,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Parse => write!(f, "parse error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
