//! Register map for the interferometer control block.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding offsets or bit positions.
//!
//! ```text
//! +--------+-------+--------+------------------------------------------+
//! | Offset | Width | Access | Meaning                                  |
//! +--------+-------+--------+------------------------------------------+
//! | 0x00   | 64    | R      | Status A (phase arm A, signed)           |
//! | 0x08   | 64    | R      | Status B (phase arm B, signed)           |
//! | 0x10   | 32    | R/W    | Control                                  |
//! +--------+-------+--------+------------------------------------------+
//! ```

// ---------------------------------------------------------------------------
// Block placement
// ---------------------------------------------------------------------------

/// Physical base address of the register block on the reference board.
pub const DEFAULT_BASE: usize = 0x4000_0000;

/// Status A (64-bit, read-only).
pub const STATUS_A_OFFSET: usize = 0x00;
/// Status B (64-bit, read-only).
pub const STATUS_B_OFFSET: usize = 0x08;
/// Control (32-bit, read/write).
pub const CONTROL_OFFSET: usize = 0x10;

/// Alignment every base address must satisfy for the 64-bit status reads.
pub const BASE_ALIGN: usize = 8;

// ---------------------------------------------------------------------------
// Control register bits
// ---------------------------------------------------------------------------

/// bit0: device enable.
pub const CTRL_ENABLE: u32 = 1 << 0;
/// bit1: beam-splitter active (path separation).
pub const CTRL_BEAM_SPLIT: u32 = 1 << 1;
/// bit4: high-resolution phase mode.
pub const CTRL_HIGH_RES: u32 = 1 << 4;
/// bit31: emergency latch. Terminal; cleared only by an authorised reboot.
pub const CTRL_EMERGENCY_LATCH: u32 = 1 << 31;

/// Reset pattern (all bits clear).
pub const CTRL_RESET: u32 = 0;
/// Operating pattern written after reset.
pub const CTRL_OPERATE: u32 = CTRL_ENABLE | CTRL_HIGH_RES;

/// Every control bit with a defined meaning during normal operation.
pub const CTRL_OPERATING_BITS: u32 = CTRL_ENABLE | CTRL_BEAM_SPLIT | CTRL_HIGH_RES;

const _: () = assert!(CTRL_EMERGENCY_LATCH & CTRL_OPERATING_BITS == 0);

/// True if the control word carries the emergency latch.
#[inline]
pub const fn is_latched(control: u32) -> bool {
    control & CTRL_EMERGENCY_LATCH != 0
}
