//! Port traits: the boundary between the interlock core and the
//! surrounding system.
//!
//! ```text
//!   MetricsSource ──▶ InterlockService ──▶ DecisionPort
//!                            │
//!                            └──────────▶ EventSink
//! ```
//!
//! The gate predicates owned by the surrounding system are injected
//! separately through [`GatePolicy`](crate::safety::GatePolicy).

use crate::metrics::{AmbientMetrics, MetricsSnapshot};
use crate::safety::GateMask;

// ───────────────────────────────────────────────────────────────
// Metrics source (driven adapter: surrounding system → core)
// ───────────────────────────────────────────────────────────────

/// Supplies the four snapshot fields the decoder does not derive.
pub trait MetricsSource {
    /// Values for the cycle that is about to be verified.
    fn ambient(&mut self) -> AmbientMetrics;
}

// ───────────────────────────────────────────────────────────────
// Decision port (driven adapter: core → decision layer)
// ───────────────────────────────────────────────────────────────

/// Verdict for one verified cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub snapshot: MetricsSnapshot,
    pub mask: GateMask,
    pub passed: bool,
}

/// Pure consumer of gate results.  Called once per decoded full-spin
/// cycle, whether or not the gates passed.
pub trait DecisionPort {
    fn on_verdict(&mut self, verdict: &Verdict);
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
