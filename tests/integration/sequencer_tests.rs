//! Acquisition sequencer against the journaling register mock.

use embedded_hal::delay::DelayNs;
use interferometer::acquisition::decoder::{self, MeasurementOutcome};
use interferometer::acquisition::{DeviceState, Sequencer, SettleConfig};
use interferometer::drivers::containment;
use interferometer::drivers::sim::SimRegisters;
use interferometer::error::AcquireError;
use interferometer::metrics::RawSample;
use interferometer::regmap;

use crate::mock_hw::{ControlAccess, JournalRegisters, RecordingDelay};

fn sequencer(regs: &JournalRegisters) -> Sequencer<&JournalRegisters, RecordingDelay> {
    Sequencer::new(regs, RecordingDelay::default(), SettleConfig::default())
}

// ── initialize() ──────────────────────────────────────────────

#[test]
fn initialize_writes_reset_then_operate() {
    let regs = JournalRegisters::new();
    let mut seq = sequencer(&regs);
    seq.initialize().unwrap();

    assert_eq!(
        regs.journal(),
        vec![ControlAccess::Write(0x00), ControlAccess::Write(0x11)]
    );
    assert_eq!(regs.control(), 0x11);
}

#[test]
fn repeated_initialize_ends_in_same_state() {
    let regs = JournalRegisters::new();
    let mut seq = sequencer(&regs);
    for _ in 0..4 {
        seq.initialize().unwrap();
        assert_eq!(regs.control(), regmap::CTRL_OPERATE);
        assert_eq!(seq.state(), DeviceState::Initialized);
    }
    // Every call produces its own reset edge.
    assert_eq!(regs.journal().len(), 8);
}

#[test]
fn reinitialize_clears_beam_split() {
    let regs = JournalRegisters::with_sample(7, 7);
    let mut seq = sequencer(&regs);
    seq.initialize().unwrap();
    seq.measure().unwrap();
    assert_ne!(regs.control() & regmap::CTRL_BEAM_SPLIT, 0);

    seq.initialize().unwrap();
    assert_eq!(regs.control(), regmap::CTRL_OPERATE);
}

// ── measure() ─────────────────────────────────────────────────

#[test]
fn measure_sets_beam_split_without_disturbing_other_bits() {
    let regs = JournalRegisters::with_sample(1000, 1000);
    let mut seq = sequencer(&regs);
    seq.initialize().unwrap();
    regs.clear_journal();

    seq.measure().unwrap();

    assert_eq!(
        regs.journal(),
        vec![ControlAccess::SetBits(regmap::CTRL_BEAM_SPLIT)]
    );
    assert_eq!(
        regs.control(),
        regmap::CTRL_ENABLE | regmap::CTRL_BEAM_SPLIT | regmap::CTRL_HIGH_RES
    );
}

#[test]
fn measure_before_initialize_touches_nothing() {
    let regs = JournalRegisters::with_sample(1, 1);
    let mut seq = sequencer(&regs);
    assert_eq!(seq.measure(), Err(AcquireError::NotInitialized));
    assert!(regs.journal().is_empty());
}

#[test]
fn measure_waits_minimum_settle_time() {
    let regs = JournalRegisters::with_sample(0, 0);
    let delay = RecordingDelay::default();
    let settle = SettleConfig {
        min_us: 25,
        poll_us: 5,
        timeout_us: 500,
    };
    let mut seq = Sequencer::new(&regs, delay.clone(), settle);
    seq.initialize().unwrap();
    seq.measure().unwrap();
    assert_eq!(delay.total_us(), 25);
}

#[test]
fn outcomes_follow_decoder_bands() {
    let regs = JournalRegisters::new();
    let mut seq = sequencer(&regs);
    seq.initialize().unwrap();

    // Quarter-range delta: phase ≈ π/2, interference ≈ 0.5.
    let partial = RawSample::new(i64::MAX / 4, 0);
    regs.sim.load_sample(partial);
    assert_eq!(
        decoder::decode(partial).outcome,
        MeasurementOutcome::PartialSpinConfined
    );
    match seq.measure() {
        Err(AcquireError::PartialSpin { snapshot, interference }) => {
            assert_eq!(snapshot.spin, 0.5);
            assert!((interference - 0.5).abs() < 1e-9);
        }
        other => panic!("expected partial spin, got {other:?}"),
    }

    // Half-range delta: phase ≈ π, interference ≈ 0.
    regs.sim.load_sample(RawSample::new(i64::MAX / 2, 0));
    assert!(matches!(
        seq.measure(),
        Err(AcquireError::Measurement { interference }) if interference < 0.01
    ));

    // Full-range delta: phase ≈ 2π, back to a bright fringe.
    regs.sim.load_sample(RawSample::new(i64::MAX, 0));
    assert_eq!(seq.measure().map(|s| s.spin), Ok(1.0));
}

#[test]
fn extreme_samples_do_not_overflow() {
    let regs = JournalRegisters::with_sample(i64::MAX, i64::MIN);
    let mut seq = sequencer(&regs);
    seq.initialize().unwrap();
    // Δ = 2·INT64_MAX + 1, phase ≈ 4π: bright fringe.
    assert_eq!(seq.measure().map(|s| s.spin), Ok(1.0));
}

// ── Settle ────────────────────────────────────────────────────

#[test]
fn never_settling_device_times_out() {
    let regs = JournalRegisters::with_sample(0, 0);
    regs.sim.set_settle_latency(u32::MAX);
    let delay = RecordingDelay::default();
    let settle = SettleConfig {
        min_us: 4,
        poll_us: 8,
        timeout_us: 100,
    };
    let mut seq = Sequencer::new(&regs, delay.clone(), settle);
    seq.initialize().unwrap();

    assert_eq!(
        seq.measure(),
        Err(AcquireError::SettleTimeout { waited_us: 100 })
    );
    assert_eq!(delay.total_us(), 100);
    assert_eq!(seq.state(), DeviceState::Initialized);
}

// ── Interrupt during acquisition ──────────────────────────────

/// Delay that raises the emergency interrupt on its first call.
struct InterruptingDelay<'a> {
    regs: &'a SimRegisters,
}

impl DelayNs for InterruptingDelay<'_> {
    fn delay_ns(&mut self, _ns: u32) {
        containment::seal(self.regs);
    }
}

#[test]
fn interrupt_during_settle_aborts_measure() {
    let regs = SimRegisters::new();
    regs.load_sample(RawSample::new(1000, 1000));
    let mut seq = Sequencer::new(
        &regs,
        InterruptingDelay { regs: &regs },
        SettleConfig::default(),
    );
    seq.initialize().unwrap();

    assert_eq!(seq.measure(), Err(AcquireError::Halted));
    assert_eq!(seq.state(), DeviceState::Halted);
    assert_eq!(regs.control(), regmap::CTRL_EMERGENCY_LATCH);
}
