//! Acquisition sequencer.
//!
//! Drives the control register through the fixed acquisition sequence:
//!
//! ```text
//! initialize():  CTRL ← 0x00 (reset)  →  CTRL ← ENABLE | HIGH_RES
//! measure():     CTRL |= BEAM_SPLIT   →  settle  →  (A, B)  →  decode
//! ```
//!
//! ## Device state
//!
//! ```text
//! Uninitialized ──initialize()──▶ Initialized ◀──▶ Active (mid-measure)
//!        │                             │                │
//!        └────────── emergency interrupt (any state) ───┴──▶ Halted
//! ```
//!
//! `Halted` is read from the hardware: the emergency latch bit in the
//! control register is the single source of truth, so the interrupt path
//! never needs to reach into this struct.  Nothing here leaves `Halted`.
//!
//! One acquisition at a time: the sequencer takes `&mut self` and the
//! caller must not drive the same register block from a second sequencer.

pub mod decoder;

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::drivers::registers::RegisterBlock;
use crate::error::AcquireError;
use crate::metrics::{MetricsSnapshot, RawSample};
use crate::regmap;
use decoder::MeasurementOutcome;

/// Lifecycle of the device as seen by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Uninitialized,
    Initialized,
    Active,
    /// Emergency latch set.  Terminal for this process.
    Halted,
}

/// Bounded settle wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleConfig {
    /// Unconditional delay after activating the beam-splitter (µs).
    pub min_us: u32,
    /// Poll period while the device is not yet settled (µs).
    pub poll_us: u32,
    /// Upper bound on the whole wait (µs).
    pub timeout_us: u32,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            min_us: 1,
            poll_us: 1,
            timeout_us: 1_000,
        }
    }
}

pub struct Sequencer<R, D> {
    regs: R,
    delay: D,
    settle: SettleConfig,
    /// Software phase; overridden by the hardware latch in [`state`](Self::state).
    phase: DeviceState,
}

impl<R: RegisterBlock, D: DelayNs> Sequencer<R, D> {
    pub fn new(regs: R, delay: D, settle: SettleConfig) -> Self {
        Self {
            regs,
            delay,
            settle,
            phase: DeviceState::Uninitialized,
        }
    }

    /// Current device state.  `Halted` whenever the latch is set.
    pub fn state(&self) -> DeviceState {
        if self.latched() {
            DeviceState::Halted
        } else {
            self.phase
        }
    }

    /// Borrow the register block (diagnostics, tests).
    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn settle_config(&self) -> SettleConfig {
        self.settle
    }

    /// Reset the device and enable high-resolution mode.
    ///
    /// Two separate writes so the hardware sees the reset edge.  Safe to
    /// call repeatedly.  Refused on a halted device: the latch is never
    /// overwritten from normal control flow.
    pub fn initialize(&mut self) -> Result<(), AcquireError> {
        if self.latched() {
            error!("sequencer: initialize refused, device halted");
            return Err(self.halted());
        }

        self.regs.write_control(regmap::CTRL_RESET);
        self.regs.write_control(regmap::CTRL_OPERATE);
        self.phase = DeviceState::Initialized;

        info!(
            "sequencer: initialized (ctrl=0x{:08x})",
            self.regs.read_control()
        );
        Ok(())
    }

    /// Run one acquisition and decode it.
    ///
    /// `Ok` only for a full spin.  A partial spin comes back as
    /// [`AcquireError::PartialSpin`] carrying its reduced-confidence
    /// snapshot.
    pub fn measure(&mut self) -> Result<MetricsSnapshot, AcquireError> {
        let sample = self.acquire()?;
        let decoded = decoder::decode(sample);
        debug!(
            "sequencer: phase_diff={:.6} interference={:.6} -> {:?}",
            decoded.phase_diff, decoded.interference, decoded.outcome
        );

        match decoded.outcome {
            MeasurementOutcome::FullSpinDetected => {
                Ok(MetricsSnapshot::from_spin(decoder::SPIN_FULL))
            }
            MeasurementOutcome::PartialSpinConfined => Err(AcquireError::PartialSpin {
                snapshot: MetricsSnapshot::from_spin(decoder::SPIN_PARTIAL),
                interference: decoded.interference,
            }),
            MeasurementOutcome::MeasurementError => Err(AcquireError::Measurement {
                interference: decoded.interference,
            }),
        }
    }

    /// Steps 1-4 of the sequence: precondition, beam-split, settle, read.
    pub fn acquire(&mut self) -> Result<RawSample, AcquireError> {
        match self.state() {
            DeviceState::Halted => return Err(self.halted()),
            DeviceState::Uninitialized => return Err(AcquireError::NotInitialized),
            DeviceState::Initialized | DeviceState::Active => {}
        }

        self.phase = DeviceState::Active;
        self.regs.set_control_bits(regmap::CTRL_BEAM_SPLIT);

        let settled = self.wait_settled();
        if self.latched() {
            error!("sequencer: emergency latch set during settle");
            return Err(self.halted());
        }
        if let Err(e) = settled {
            self.phase = DeviceState::Initialized;
            warn!("sequencer: {}", e);
            return Err(e);
        }

        let sample = self.regs.read_sample();
        self.phase = DeviceState::Initialized;

        // A sample read across the interrupt cannot be trusted.
        if self.latched() {
            error!("sequencer: emergency latch set during read");
            return Err(self.halted());
        }

        debug!("sequencer: raw a={} b={}", sample.a, sample.b);
        Ok(sample)
    }

    // ── Internal ──────────────────────────────────────────────

    fn latched(&self) -> bool {
        regmap::is_latched(self.regs.read_control())
    }

    /// The latch wiped the operating pattern; the device needs a fresh
    /// `initialize()` if it ever comes back.
    fn halted(&mut self) -> AcquireError {
        self.phase = DeviceState::Uninitialized;
        AcquireError::Halted
    }

    /// Minimum delay, then poll until settled or the bound is reached.
    fn wait_settled(&mut self) -> Result<(), AcquireError> {
        let SettleConfig {
            min_us,
            poll_us,
            timeout_us,
        } = self.settle;
        let poll_us = poll_us.max(1);

        self.delay.delay_us(min_us);
        let mut waited_us = min_us;

        while !self.regs.settled() {
            if waited_us >= timeout_us || self.latched() {
                return Err(AcquireError::SettleTimeout { waited_us });
            }
            let step = poll_us.min(timeout_us - waited_us);
            self.delay.delay_us(step);
            waited_us += step;
        }
        Ok(())
    }
}
