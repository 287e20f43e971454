//! Spin decoder.
//!
//! Pure function of a [`RawSample`]:
//!
//! ```text
//! phase_diff   = (A - B) * 2π / i64::MAX
//! interference = cos²(phase_diff / 2)            ∈ [0, 1]
//!
//!   interference > 0.9         → FullSpinDetected     spin = 1.0
//!   0.4 < interference < 0.6   → PartialSpinConfined  spin = 0.5
//!   anything else              → MeasurementError
//! ```
//!
//! Both bands are open.  The exact values 0.4, 0.6 and 0.9, and the whole
//! gap (0.6, 0.9], decode as `MeasurementError`.

use core::f64::consts::TAU;

use crate::metrics::RawSample;

/// Interference strictly above this is a full spin.
pub const FULL_SPIN_THRESHOLD: f64 = 0.9;
/// Lower (exclusive) edge of the partial band.
pub const PARTIAL_SPIN_LOW: f64 = 0.4;
/// Upper (exclusive) edge of the partial band.
pub const PARTIAL_SPIN_HIGH: f64 = 0.6;

/// Primary metric reported for a full spin.
pub const SPIN_FULL: f64 = 1.0;
/// Primary metric reported for a confined (partial) spin.
pub const SPIN_PARTIAL: f64 = 0.5;

/// Discrete classification of one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementOutcome {
    /// Success.
    FullSpinDetected,
    /// Recoverable "incomplete" result.  Not a failure.
    PartialSpinConfined,
    /// Outside every recognised band.  Fatal to the cycle, not the device.
    MeasurementError,
}

impl MeasurementOutcome {
    /// Primary metric for this outcome; `None` when no snapshot is produced.
    pub const fn spin(self) -> Option<f64> {
        match self {
            Self::FullSpinDetected => Some(SPIN_FULL),
            Self::PartialSpinConfined => Some(SPIN_PARTIAL),
            Self::MeasurementError => None,
        }
    }
}

/// Everything the decoder derives from one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub phase_diff: f64,
    pub interference: f64,
    pub outcome: MeasurementOutcome,
}

/// Phase difference between the two arms (rad).
///
/// The subtraction is done in `i128` so opposite-sign extremes cannot
/// overflow.
pub fn phase_diff(sample: RawSample) -> f64 {
    let delta = i128::from(sample.a) - i128::from(sample.b);
    delta as f64 * TAU / i64::MAX as f64
}

/// cos²(phase_diff / 2).
pub fn interference(phase_diff: f64) -> f64 {
    let c = (phase_diff / 2.0).cos();
    c * c
}

/// Map an interference value onto its band.
pub fn classify(interference: f64) -> MeasurementOutcome {
    if interference > FULL_SPIN_THRESHOLD {
        MeasurementOutcome::FullSpinDetected
    } else if interference > PARTIAL_SPIN_LOW && interference < PARTIAL_SPIN_HIGH {
        MeasurementOutcome::PartialSpinConfined
    } else {
        MeasurementOutcome::MeasurementError
    }
}

pub fn decode(sample: RawSample) -> Decoded {
    let phase_diff = phase_diff(sample);
    let interference = interference(phase_diff);
    Decoded {
        phase_diff,
        interference,
        outcome: classify(interference),
    }
}
