//! Simulated register block for host builds.
//!
//! Backs the three registers with atomics so the normal acquisition path
//! and a simulated interrupt (another thread) can share one instance with
//! no locks.  The emergency latch behaves like the real hardware latch:
//! once bit31 is set, control writes cannot clear it until
//! [`SimRegisters::power_cycle`], which stands in for the out-of-band
//! authorised reboot.

use core::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::time::Duration;

use embedded_hal::delay::DelayNs;

use super::registers::RegisterBlock;
use crate::metrics::RawSample;
use crate::regmap;

#[derive(Debug, Default)]
pub struct SimRegisters {
    status_a: AtomicI64,
    status_b: AtomicI64,
    control: AtomicU32,
    /// `settled()` polls left that still report "not ready".
    unsettled_polls: AtomicU32,
}

impl SimRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the values the next acquisition will read.
    pub fn load_sample(&self, sample: RawSample) {
        self.status_a.store(sample.a, Ordering::Relaxed);
        self.status_b.store(sample.b, Ordering::Release);
    }

    /// Make the next `polls` calls to `settled()` report "not ready".
    /// `u32::MAX` keeps the device unsettled for good.
    pub fn set_settle_latency(&self, polls: u32) {
        self.unsettled_polls.store(polls, Ordering::Relaxed);
    }

    /// Current control word, for assertions.
    pub fn control(&self) -> u32 {
        self.control.load(Ordering::Acquire)
    }

    /// Out-of-band reboot: the only way to clear the emergency latch.
    pub fn power_cycle(&self) {
        self.control.store(regmap::CTRL_RESET, Ordering::Release);
        self.unsettled_polls.store(0, Ordering::Relaxed);
    }
}

impl RegisterBlock for SimRegisters {
    fn read_status_a(&self) -> i64 {
        self.status_a.load(Ordering::Acquire)
    }

    fn read_status_b(&self) -> i64 {
        self.status_b.load(Ordering::Acquire)
    }

    fn read_control(&self) -> u32 {
        self.control.load(Ordering::Acquire)
    }

    fn write_control(&self, value: u32) {
        // The closure never returns `None`, so the update cannot fail.
        let _ = self
            .control
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if regmap::is_latched(current) {
                    Some(current)
                } else {
                    Some(value)
                }
            });
    }

    fn set_control_bits(&self, bits: u32) {
        self.control.fetch_or(bits, Ordering::AcqRel);
    }

    fn settled(&self) -> bool {
        let remaining = self.unsettled_polls.load(Ordering::Relaxed);
        match remaining {
            0 => true,
            u32::MAX => false,
            n => {
                self.unsettled_polls.store(n - 1, Ordering::Relaxed);
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Host delay
// ---------------------------------------------------------------------------

/// `DelayNs` backed by `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}
