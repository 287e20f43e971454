//! InterlockService end-to-end against mock ports.

use interferometer::app::events::AppEvent;
use interferometer::app::service::{CycleKind, CycleOutcome, InterlockService};
use interferometer::config::DriverConfig;
use interferometer::drivers::containment;
use interferometer::error::AcquireError;
use interferometer::metrics::{AmbientMetrics, RawSample};
use interferometer::safety::{ExternalGates, Gate, GateMask};
use interferometer::DeviceState;

use crate::mock_hw::{
    DecisionLog, EventLog, FixedAmbient, JournalRegisters, NOMINAL_AMBIENT, RecordingDelay,
    StubGates,
};

struct Rig {
    ambient: FixedAmbient,
    decisions: DecisionLog,
    events: EventLog,
}

impl Rig {
    fn new(ambient: AmbientMetrics) -> Self {
        Self {
            ambient: FixedAmbient(ambient),
            decisions: DecisionLog::default(),
            events: EventLog::default(),
        }
    }
}

fn started<'a>(
    regs: &'a JournalRegisters,
    gates: StubGates,
    config: &DriverConfig,
    rig: &mut Rig,
) -> InterlockService<&'a JournalRegisters, RecordingDelay, StubGates> {
    let mut svc = InterlockService::new(regs, RecordingDelay::default(), gates, config);
    svc.start(&mut rig.events).unwrap();
    svc
}

// ── Verified path ─────────────────────────────────────────────

#[test]
fn nominal_cycle_passes_every_gate() {
    let regs = JournalRegisters::with_sample(1000, 1000);
    let mut rig = Rig::new(NOMINAL_AMBIENT);
    let mut svc = started(&regs, StubGates::OPEN, &DriverConfig::default(), &mut rig);

    let outcome = svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);

    assert!(outcome.passed());
    let CycleOutcome::Verdict(verdict) = outcome else {
        panic!("expected verdict, got {outcome:?}");
    };
    assert_eq!(verdict.mask.bits(), 0x7F);
    assert_eq!(verdict.snapshot.spin, 1.0);
    assert_eq!(verdict.snapshot.coherence_volume, 4.0e-47);
    assert_eq!(rig.decisions.verdicts, vec![verdict]);
    assert_eq!(
        rig.events.events,
        vec![
            AppEvent::Initialized,
            AppEvent::CycleVerified { mask: GateMask::ALL }
        ]
    );
    assert_eq!(svc.stats().verified, 1);
}

#[test]
fn entropy_drift_clears_only_entropy_gate() {
    let regs = JournalRegisters::with_sample(1000, 1000);
    let mut rig = Rig::new(AmbientMetrics {
        entropy: 0.7,
        ..NOMINAL_AMBIENT
    });
    let mut svc = started(&regs, StubGates::OPEN, &DriverConfig::default(), &mut rig);

    let outcome = svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);

    let CycleOutcome::Verdict(verdict) = outcome else {
        panic!("expected verdict, got {outcome:?}");
    };
    assert!(!verdict.passed);
    assert_eq!(verdict.mask.bits(), 0x7B);
    assert_eq!(verdict.mask.failed().collect::<Vec<_>>(), vec![Gate::Entropy]);
    assert_eq!(
        rig.events.events.last(),
        Some(&AppEvent::GateRejected { mask: verdict.mask })
    );
    assert_eq!(svc.last_cycle().map(|r| r.kind), Some(CycleKind::Rejected));
}

#[test]
fn external_veto_blocks_verification() {
    let regs = JournalRegisters::with_sample(1000, 1000);
    let mut rig = Rig::new(NOMINAL_AMBIENT);
    let gates = StubGates {
        veto: false,
        ..StubGates::OPEN
    };
    let mut svc = started(&regs, gates, &DriverConfig::default(), &mut rig);

    let outcome = svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);
    assert!(!outcome.passed());
    assert_eq!(rig.decisions.verdicts[0].mask.bits(), 0x3F);
}

#[test]
fn default_gate_table_never_verifies() {
    let regs = JournalRegisters::with_sample(1000, 1000);
    let mut rig = Rig::new(NOMINAL_AMBIENT);
    let mut svc = InterlockService::new(
        &regs,
        RecordingDelay::default(),
        ExternalGates::default(),
        &DriverConfig::default(),
    );
    svc.start(&mut rig.events).unwrap();

    let outcome = svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);
    assert!(!outcome.passed());
    assert_eq!(rig.decisions.verdicts[0].mask.bits(), 0x07);
}

// ── Partial and failed cycles ─────────────────────────────────

#[test]
fn partial_spin_skips_verification() {
    let regs = JournalRegisters::with_sample(i64::MAX / 4, 0);
    let mut rig = Rig::new(NOMINAL_AMBIENT);
    let mut svc = started(&regs, StubGates::OPEN, &DriverConfig::default(), &mut rig);

    let outcome = svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);

    let CycleOutcome::Partial { snapshot, .. } = outcome else {
        panic!("expected partial, got {outcome:?}");
    };
    assert_eq!(snapshot.spin, 0.5);
    assert!(rig.decisions.verdicts.is_empty());
    assert!(matches!(
        rig.events.events.last(),
        Some(AppEvent::PartialSpin { .. })
    ));
    assert_eq!(svc.stats().partial, 1);
    assert_eq!(svc.stats().retries, 0);
}

#[test]
fn dark_fringe_is_retried_then_reported() {
    let regs = JournalRegisters::with_sample(i64::MAX / 2, 0);
    let mut rig = Rig::new(NOMINAL_AMBIENT);
    let config = DriverConfig {
        measure_retries: 2,
        ..DriverConfig::default()
    };
    let mut svc = started(&regs, StubGates::OPEN, &config, &mut rig);

    let outcome = svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);

    assert!(matches!(
        outcome,
        CycleOutcome::Failed(AcquireError::Measurement { .. })
    ));
    let events = &rig.events.events;
    assert_eq!(events[1], AppEvent::RetryScheduled { attempt: 1 });
    assert_eq!(events[2], AppEvent::RetryScheduled { attempt: 2 });
    assert!(matches!(
        events[3],
        AppEvent::MeasurementFailed {
            interference: Some(_)
        }
    ));
    assert_eq!(svc.last_cycle().map(|r| r.attempts), Some(3));
    assert_eq!(svc.stats().retries, 2);
    assert_eq!(svc.stats().failed, 1);
    assert!(rig.decisions.verdicts.is_empty());
}

#[test]
fn slow_settle_recovers_on_retry() {
    let regs = JournalRegisters::with_sample(1000, 1000);
    let mut rig = Rig::new(NOMINAL_AMBIENT);
    let config = DriverConfig {
        settle_min_us: 1,
        settle_poll_us: 1,
        settle_timeout_us: 3,
        measure_retries: 1,
        ..DriverConfig::default()
    };
    let mut svc = started(&regs, StubGates::OPEN, &config, &mut rig);
    // Three "not ready" polls exhaust the first attempt's 3us budget.
    regs.sim.set_settle_latency(3);

    let outcome = svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);

    assert!(outcome.passed());
    assert_eq!(svc.last_cycle().map(|r| r.attempts), Some(2));
    assert_eq!(svc.stats().retries, 1);
}

// ── Halt ──────────────────────────────────────────────────────

#[test]
fn sealed_device_abandons_cycles_without_retry() {
    let regs = JournalRegisters::with_sample(1000, 1000);
    let mut rig = Rig::new(NOMINAL_AMBIENT);
    let mut svc = started(&regs, StubGates::OPEN, &DriverConfig::default(), &mut rig);

    containment::seal(&regs.sim);
    let outcome = svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);

    assert_eq!(outcome, CycleOutcome::Failed(AcquireError::Halted));
    assert_eq!(svc.state(), DeviceState::Halted);
    assert_eq!(rig.events.events.last(), Some(&AppEvent::Halted));
    assert_eq!(svc.last_cycle().map(|r| r.kind), Some(CycleKind::Halted));
    assert_eq!(svc.stats().retries, 0);
    assert!(rig.decisions.verdicts.is_empty());
}

#[test]
fn history_keeps_cycle_order() {
    let regs = JournalRegisters::new();
    let mut rig = Rig::new(NOMINAL_AMBIENT);
    let config = DriverConfig {
        measure_retries: 0,
        ..DriverConfig::default()
    };
    let mut svc = started(&regs, StubGates::OPEN, &config, &mut rig);

    for sample in [
        RawSample::new(5, 5),
        RawSample::new(i64::MAX / 4, 0),
        RawSample::new(i64::MAX / 2, 0),
    ] {
        regs.sim.load_sample(sample);
        svc.run_cycle(&mut rig.ambient, &mut rig.decisions, &mut rig.events);
    }

    let kinds: Vec<_> = svc.history().map(|r| (r.cycle, r.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (1, CycleKind::Verified),
            (2, CycleKind::Partial),
            (3, CycleKind::Failed),
        ]
    );
    assert_eq!(svc.history().next().and_then(|r| r.mask), Some(GateMask::ALL));
}
