//! Register Interface.
//!
//! Typed accessors over the three memory-mapped registers.  No logic lives
//! here, only read/write semantics.  Every access is volatile because the
//! registers alias live hardware state.  Nothing in this layer returns an
//! error: a failed bus access shows up downstream as a decode anomaly.
//!
//! All methods take `&self` so one block can be shared between the normal
//! acquisition path and the interrupt path.

use core::ptr::{read_volatile, write_volatile};
use std::sync::Arc;

use crate::metrics::RawSample;
use crate::regmap;

/// Read/write access to the interferometer register block.
pub trait RegisterBlock {
    /// Status A (64-bit, read-only).
    fn read_status_a(&self) -> i64;

    /// Status B (64-bit, read-only).
    fn read_status_b(&self) -> i64;

    /// Control register (32-bit).
    fn read_control(&self) -> u32;

    /// Whole-value control write.
    fn write_control(&self, value: u32);

    /// Read-modify-write: OR `bits` into the control register.
    fn set_control_bits(&self, bits: u32) {
        let current = self.read_control();
        self.write_control(current | bits);
    }

    /// Both status registers, A then B, with no control write in between.
    fn read_sample(&self) -> RawSample {
        let a = self.read_status_a();
        let b = self.read_status_b();
        RawSample { a, b }
    }

    /// Whether the device reports the optical paths as settled.
    ///
    /// Blocks without a ready line are settled once the minimum settle
    /// delay has elapsed.
    fn settled(&self) -> bool {
        true
    }
}

// Forward every method, including the provided ones, so wrapper types keep
// the backing store's own read-modify-write semantics.
macro_rules! forward_register_block {
    ($($t:tt)*) => {
        $($t)* {
            fn read_status_a(&self) -> i64 { (**self).read_status_a() }
            fn read_status_b(&self) -> i64 { (**self).read_status_b() }
            fn read_control(&self) -> u32 { (**self).read_control() }
            fn write_control(&self, value: u32) { (**self).write_control(value) }
            fn set_control_bits(&self, bits: u32) { (**self).set_control_bits(bits) }
            fn read_sample(&self) -> RawSample { (**self).read_sample() }
            fn settled(&self) -> bool { (**self).settled() }
        }
    };
}

forward_register_block!(impl<T: RegisterBlock + ?Sized> RegisterBlock for &T);
forward_register_block!(impl<T: RegisterBlock + ?Sized> RegisterBlock for Arc<T>);

// ---------------------------------------------------------------------------
// Memory-mapped implementation
// ---------------------------------------------------------------------------

/// Register block at a fixed physical address.
#[derive(Debug, Clone, Copy)]
pub struct MmioRegisters {
    base: usize,
}

impl MmioRegisters {
    /// # Safety
    ///
    /// `base` must be the 8-byte aligned address of a mapped interferometer
    /// register block that stays mapped for the lifetime of the returned
    /// value and every copy of it.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline]
    fn status_ptr(&self, offset: usize) -> *const i64 {
        (self.base + offset) as *const i64
    }

    #[inline]
    fn control_ptr(&self) -> *mut u32 {
        (self.base + regmap::CONTROL_OFFSET) as *mut u32
    }
}

impl RegisterBlock for MmioRegisters {
    fn read_status_a(&self) -> i64 {
        // SAFETY: `new` contract: base maps the register block.
        unsafe { read_volatile(self.status_ptr(regmap::STATUS_A_OFFSET)) }
    }

    fn read_status_b(&self) -> i64 {
        // SAFETY: `new` contract: base maps the register block.
        unsafe { read_volatile(self.status_ptr(regmap::STATUS_B_OFFSET)) }
    }

    fn read_control(&self) -> u32 {
        // SAFETY: `new` contract: base maps the register block.
        unsafe { read_volatile(self.control_ptr()) }
    }

    fn write_control(&self, value: u32) {
        // SAFETY: `new` contract: base maps the register block.
        unsafe { write_volatile(self.control_ptr(), value) }
    }
}
