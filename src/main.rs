//! Interferometer bench simulator, host entry point.
//!
//! Drives the full interlock stack against [`SimRegisters`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  SimRegisters ◀── phase sweep          emergency thread  │
//! │       │                                      │           │
//! │       ▼                                      ▼           │
//! │  InterlockService (sequencer · decoder · gates)  contain │
//! │       │                                                  │
//! │       ▼                                                  │
//! │  LogEventSink · BenchDecision                            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `interferometer-sim [config.json]`.  Log level via `RUST_LOG`.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tracing_subscriber::EnvFilter;

use interferometer::adapters::log_sink::LogEventSink;
use interferometer::app::ports::{DecisionPort, MetricsSource, Verdict};
use interferometer::app::service::InterlockService;
use interferometer::config::DriverConfig;
use interferometer::drivers::containment;
use interferometer::drivers::sim::{SimRegisters, StdDelay};
use interferometer::metrics::{AmbientMetrics, MetricsSnapshot, RawSample};
use interferometer::safety::ExternalGates;

// ── Bench collaborators ───────────────────────────────────────

/// Nominal ambient readings for the reference bench.
struct BenchAmbient;

impl MetricsSource for BenchAmbient {
    fn ambient(&mut self) -> AmbientMetrics {
        AmbientMetrics {
            coherence_volume: 4.0e-47,
            entropy: 0.6931,
            phase_error: 1.0e-3,
            viscosity: 0.0,
        }
    }
}

/// Decision layer stand-in: counts verdicts.
#[derive(Default)]
struct BenchDecision {
    accepted: u32,
    refused: u32,
}

impl DecisionPort for BenchDecision {
    fn on_verdict(&mut self, verdict: &Verdict) {
        if verdict.passed {
            self.accepted += 1;
        } else {
            self.refused += 1;
        }
    }
}

/// Bench gates: open while the phase error stays small.
fn phase_error_small(m: &MetricsSnapshot) -> bool {
    m.phase_error.abs() < 0.01
}

fn always(_: &MetricsSnapshot) -> bool {
    true
}

const BENCH_GATES: ExternalGates = ExternalGates {
    firewall: phase_error_small,
    backup: always,
    consensus: always,
    veto: always,
};

/// Simulated interrupt context.  Never returns.
fn emergency_interrupt(regs: &SimRegisters) {
    containment::contain(regs)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("interferometer-sim v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            DriverConfig::from_json(&json)?
        }
        None => DriverConfig::default(),
    };
    info!("config: {:?}", config);

    let regs = Arc::new(SimRegisters::new());
    let mut service = InterlockService::new(Arc::clone(&regs), StdDelay, BENCH_GATES, &config);
    let mut sink = LogEventSink::new();
    let mut ambient = BenchAmbient;
    let mut decision = BenchDecision::default();

    service.start(&mut sink)?;

    // Sweep arm B across one fringe: full, gap, partial and dark samples.
    let step = i64::MAX / 16;
    for k in 0..8 {
        regs.load_sample(RawSample::new(0, k * step));
        service.run_cycle(&mut ambient, &mut decision, &mut sink);
    }

    // Emergency interrupt: seal from another context, then show the
    // sequencer refusing to run.
    let isr_regs = Arc::clone(&regs);
    std::thread::spawn(move || emergency_interrupt(&isr_regs));
    while !interferometer::regmap::is_latched(regs.control()) {
        std::thread::yield_now();
    }
    let after = service.run_cycle(&mut ambient, &mut decision, &mut sink);

    let stats = service.stats();
    info!(
        "summary: cycles={} verified={} rejected={} partial={} failed={} retries={} | \
         decisions accepted={} refused={} | last={:?} | state={:?}",
        stats.cycles,
        stats.verified,
        stats.rejected,
        stats.partial,
        stats.failed,
        stats.retries,
        decision.accepted,
        decision.refused,
        after,
        service.state(),
    );

    Ok(())
}
