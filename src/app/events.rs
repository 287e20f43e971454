//! Outbound application events.
//!
//! The [`InterlockService`](super::service::InterlockService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use crate::safety::GateMask;

/// Structured events emitted by the interlock core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// Reset and enable sequence completed.
    Initialized,

    /// All seven gates passed.
    CycleVerified { mask: GateMask },

    /// Full spin decoded but at least one gate failed.
    GateRejected { mask: GateMask },

    /// Interference fell in the partial band.
    PartialSpin { interference: f64 },

    /// A retryable acquisition failure; `attempt` counts retries from 1.
    RetryScheduled { attempt: u8 },

    /// The cycle ended without a decodable sample.
    MeasurementFailed { interference: Option<f64> },

    /// The emergency latch is set.
    Halted,
}
