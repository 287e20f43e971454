//! Emergency containment.
//!
//! Runs only from the emergency interrupt.  It disables all coupling,
//! seals the device with the emergency latch and never returns.  The
//! device is halted from then on; only an authorised reboot clears it.
//!
//! The handler performs raw register writes and nothing else.  It never
//! calls into the sequencer, decoder or verifier, never logs, never takes
//! a lock and never allocates: the state of everything above the register
//! block is untrusted once the interrupt fires.
//!
//! Not reentrant.  A second entry would only repeat the same two writes.

use core::sync::atomic::{AtomicUsize, Ordering};

use super::registers::{MmioRegisters, RegisterBlock};
use crate::regmap;

/// Base address the interrupt entry point seals.  0 = not registered.
static CONTAINMENT_BASE: AtomicUsize = AtomicUsize::new(0);

/// Disable all coupling, then set the emergency latch.
///
/// Two separate writes: the device must see the disable before the seal.
pub fn seal<R: RegisterBlock + ?Sized>(regs: &R) {
    regs.write_control(regmap::CTRL_RESET);
    regs.write_control(regmap::CTRL_EMERGENCY_LATCH);
}

/// Seal the device and wait forever.
pub fn contain<R: RegisterBlock + ?Sized>(regs: &R) -> ! {
    seal(regs);
    halt_forever()
}

/// Record the register block the interrupt entry point will seal.
///
/// Call once during bring-up, before unmasking the emergency interrupt.
///
/// # Safety
///
/// `base` must satisfy the contract of [`MmioRegisters::new`] for the rest
/// of the program.
pub unsafe fn register_containment(base: usize) {
    CONTAINMENT_BASE.store(base, Ordering::Release);
}

/// Base address currently registered for containment, if any.
pub fn registered_base() -> Option<usize> {
    match CONTAINMENT_BASE.load(Ordering::Acquire) {
        0 => None,
        base => Some(base),
    }
}

/// Platform interrupt entry point.
///
/// Wire this symbol to the emergency interrupt line.  If no block was
/// registered the core still halts; there is nothing it can safely write.
#[unsafe(no_mangle)]
pub extern "C" fn interferometer_emergency_isr() -> ! {
    if let Some(base) = registered_base() {
        // SAFETY: `register_containment` contract.
        let regs = unsafe { MmioRegisters::new(base) };
        seal(&regs);
    }
    halt_forever()
}

#[cfg(target_os = "espidf")]
fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(not(target_os = "espidf"))]
fn halt_forever() -> ! {
    loop {
        std::thread::park();
    }
}
