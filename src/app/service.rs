//! Interlock service, the hexagonal core.
//!
//! [`InterlockService`] owns the sequencer and the gate verifier and runs
//! one complete cycle per call:
//!
//! ```text
//!  measure() ──▶ merge ambient ──▶ verify() ──▶ DecisionPort
//!     │  retry on transient failure                 │
//!     └──────────────── AppEvent ──▶ EventSink ◀────┘
//! ```
//!
//! Verification runs only on full-spin cycles, so the verifier never sees
//! a snapshot built from a failed decode.

use embedded_hal::delay::DelayNs;
use heapless::HistoryBuffer;
use log::{error, info, warn};

use crate::acquisition::{DeviceState, Sequencer};
use crate::config::DriverConfig;
use crate::drivers::registers::RegisterBlock;
use crate::error::AcquireError;
use crate::metrics::MetricsSnapshot;
use crate::safety::{GateMask, GatePolicy, GateVerifier};

use super::events::AppEvent;
use super::ports::{DecisionPort, EventSink, MetricsSource, Verdict};

/// Number of recent cycles kept for diagnostics.
pub const HISTORY_LEN: usize = 16;

// ───────────────────────────────────────────────────────────────
// Cycle results
// ───────────────────────────────────────────────────────────────

/// How one call to [`InterlockService::run_cycle`] ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Full spin decoded and the gates evaluated (pass or fail).
    Verdict(Verdict),
    /// Partial spin: reduced-confidence snapshot, gates not evaluated.
    Partial {
        snapshot: MetricsSnapshot,
        interference: f64,
    },
    /// No usable sample.
    Failed(AcquireError),
}

impl CycleOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Verdict(v) if v.passed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    Verified,
    Rejected,
    Partial,
    Failed,
    Halted,
}

/// Compact history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRecord {
    /// 1-based cycle number.
    pub cycle: u64,
    pub kind: CycleKind,
    /// Gate mask, for cycles that reached verification.
    pub mask: Option<GateMask>,
    /// `measure()` attempts spent on this cycle.
    pub attempts: u8,
}

/// Running counters since the service was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleStats {
    pub cycles: u64,
    pub verified: u64,
    pub rejected: u64,
    pub partial: u64,
    pub failed: u64,
    pub retries: u64,
}

// ───────────────────────────────────────────────────────────────
// InterlockService
// ───────────────────────────────────────────────────────────────

pub struct InterlockService<R, D, P> {
    sequencer: Sequencer<R, D>,
    verifier: GateVerifier<P>,
    max_retries: u8,
    stats: CycleStats,
    history: HistoryBuffer<CycleRecord, HISTORY_LEN>,
}

impl<R: RegisterBlock, D: DelayNs, P: GatePolicy> InterlockService<R, D, P> {
    /// Construct the service.  Does **not** touch the device; call
    /// [`start`](Self::start) next.
    pub fn new(regs: R, delay: D, policy: P, config: &DriverConfig) -> Self {
        Self {
            sequencer: Sequencer::new(regs, delay, config.settle()),
            verifier: GateVerifier::new(policy),
            max_retries: config.measure_retries,
            stats: CycleStats::default(),
            history: HistoryBuffer::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the reset + enable sequence.
    pub fn start(&mut self, sink: &mut impl EventSink) -> Result<(), AcquireError> {
        match self.sequencer.initialize() {
            Ok(()) => {
                sink.emit(&AppEvent::Initialized);
                info!("InterlockService started");
                Ok(())
            }
            Err(e) => {
                if e == AcquireError::Halted {
                    sink.emit(&AppEvent::Halted);
                }
                Err(e)
            }
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Acquire → decode → merge ambient metrics → verify → hand off.
    pub fn run_cycle(
        &mut self,
        source: &mut impl MetricsSource,
        decision: &mut impl DecisionPort,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        self.stats.cycles += 1;

        let mut retries: u8 = 0;
        let result = loop {
            match self.sequencer.measure() {
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    warn!("interlock: {} (retry {}/{})", e, retries, self.max_retries);
                    sink.emit(&AppEvent::RetryScheduled { attempt: retries });
                    self.stats.retries += 1;
                }
                other => break other,
            }
        };
        let attempts = retries.saturating_add(1);

        let (outcome, kind) = match result {
            Ok(decoded) => {
                let snapshot = decoded.with_ambient(source.ambient());
                let (mask, passed) = self.verifier.verify(&snapshot);
                let verdict = Verdict {
                    snapshot,
                    mask,
                    passed,
                };

                let kind = if passed {
                    self.stats.verified += 1;
                    info!("interlock: cycle {} verified", self.stats.cycles);
                    sink.emit(&AppEvent::CycleVerified { mask });
                    CycleKind::Verified
                } else {
                    self.stats.rejected += 1;
                    warn!("interlock: gates rejected, mask={}", mask);
                    sink.emit(&AppEvent::GateRejected { mask });
                    CycleKind::Rejected
                };

                decision.on_verdict(&verdict);
                (CycleOutcome::Verdict(verdict), kind)
            }
            Err(AcquireError::PartialSpin {
                snapshot,
                interference,
            }) => {
                self.stats.partial += 1;
                info!("interlock: partial spin (interference={:.4})", interference);
                sink.emit(&AppEvent::PartialSpin { interference });
                (
                    CycleOutcome::Partial {
                        snapshot,
                        interference,
                    },
                    CycleKind::Partial,
                )
            }
            Err(AcquireError::Halted) => {
                self.stats.failed += 1;
                error!("interlock: device halted, cycle abandoned");
                sink.emit(&AppEvent::Halted);
                (CycleOutcome::Failed(AcquireError::Halted), CycleKind::Halted)
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!("interlock: cycle failed: {}", e);
                let interference = match e {
                    AcquireError::Measurement { interference } => Some(interference),
                    _ => None,
                };
                sink.emit(&AppEvent::MeasurementFailed { interference });
                (CycleOutcome::Failed(e), CycleKind::Failed)
            }
        };

        let mask = match &outcome {
            CycleOutcome::Verdict(v) => Some(v.mask),
            _ => None,
        };
        self.history.write(CycleRecord {
            cycle: self.stats.cycles,
            kind,
            mask,
            attempts,
        });

        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> DeviceState {
        self.sequencer.state()
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Up to [`HISTORY_LEN`] most recent cycles, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &CycleRecord> {
        self.history.oldest_ordered()
    }

    pub fn last_cycle(&self) -> Option<&CycleRecord> {
        self.history.recent()
    }

    pub fn sequencer(&self) -> &Sequencer<R, D> {
        &self.sequencer
    }

    pub fn verifier(&self) -> &GateVerifier<P> {
        &self.verifier
    }
}
