//! Acquisition data model.
//!
//! [`RawSample`] lives for a single acquisition cycle.  [`MetricsSnapshot`]
//! is produced once per successful cycle and is read-only from then on:
//! the gate verifier and the decision layer only ever see copies.

use serde::{Deserialize, Serialize};

/// Paired instantaneous reading of Status A and Status B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub a: i64,
    pub b: i64,
}

impl RawSample {
    pub const fn new(a: i64, b: i64) -> Self {
        Self { a, b }
    }
}

/// The four fields supplied by the surrounding system each cycle.
///
/// The decoder never derives these; they pass through the snapshot untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AmbientMetrics {
    /// Coherence volume (m³).
    pub coherence_volume: f64,
    /// Entanglement entropy (nats).
    pub entropy: f64,
    /// Phase error (rad).
    pub phase_error: f64,
    /// Derived viscosity.
    pub viscosity: f64,
}

/// A point-in-time record of every metric the gate verifier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Primary metric, authoritative from the decoder.  Expected near 1.0.
    pub spin: f64,
    pub coherence_volume: f64,
    pub entropy: f64,
    pub phase_error: f64,
    pub viscosity: f64,
}

impl MetricsSnapshot {
    /// Snapshot carrying only the decoded primary metric.
    pub const fn from_spin(spin: f64) -> Self {
        Self {
            spin,
            coherence_volume: 0.0,
            entropy: 0.0,
            phase_error: 0.0,
            viscosity: 0.0,
        }
    }

    /// Full snapshot from a decoded metric and the externally supplied fields.
    pub const fn new(spin: f64, ambient: AmbientMetrics) -> Self {
        Self {
            spin,
            coherence_volume: ambient.coherence_volume,
            entropy: ambient.entropy,
            phase_error: ambient.phase_error,
            viscosity: ambient.viscosity,
        }
    }

    /// Fill the pass-through fields, keeping `spin` as decoded.
    #[must_use]
    pub const fn with_ambient(self, ambient: AmbientMetrics) -> Self {
        Self::new(self.spin, ambient)
    }

    /// The pass-through part of this snapshot.
    pub const fn ambient(&self) -> AmbientMetrics {
        AmbientMetrics {
            coherence_volume: self.coherence_volume,
            entropy: self.entropy,
            phase_error: self.phase_error,
            viscosity: self.viscosity,
        }
    }
}
