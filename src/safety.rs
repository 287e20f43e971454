//! Gate verifier.
//!
//! Seven independent conditions are evaluated against a
//! [`MetricsSnapshot`]; each one that holds sets its bit in a
//! [`GateMask`].  A cycle is verified only when all seven bits are set.
//!
//! | Bit  | Gate      | Condition                                   |
//! |------|-----------|---------------------------------------------|
//! | 0x01 | Spin      | `abs(spin - 1.0) < 0.01`                    |
//! | 0x02 | Volume    | `coherence_volume > 3.896e-47`              |
//! | 0x04 | Entropy   | `abs(entropy - ln 2) < 0.001`              |
//! | 0x08 | Firewall  | injected [`GatePolicy`]                     |
//! | 0x10 | Backup    | injected [`GatePolicy`]                     |
//! | 0x20 | Consensus | injected [`GatePolicy`]                     |
//! | 0x40 | Veto      | injected [`GatePolicy`]                     |
//! | 0x80 | -         | reserved, never set                         |
//!
//! Verification is total and pure: it never fails, never logs and never
//! touches device state.  A failed check is reported only through the
//! returned mask.  Callers must not verify snapshots from cycles that
//! ended in a measurement error.

use core::f64::consts::LN_2;
use core::fmt;

use crate::metrics::MetricsSnapshot;

/// Reference coherence volume (m³) the VOLUME gate must exceed.
pub const COHERENCE_VOLUME_REFERENCE: f64 = 3.896e-47;
/// Allowed deviation of the primary metric from 1.0.
pub const SPIN_TOLERANCE: f64 = 0.01;
/// Allowed deviation of the entropy from ln 2.
pub const ENTROPY_TOLERANCE: f64 = 0.001;

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Gate {
    Spin = 0b0000_0001,
    Volume = 0b0000_0010,
    Entropy = 0b0000_0100,
    Firewall = 0b0000_1000,
    Backup = 0b0001_0000,
    Consensus = 0b0010_0000,
    Veto = 0b0100_0000,
}

impl Gate {
    /// Every defined gate, lowest bit first.
    pub const ALL: [Gate; 7] = [
        Gate::Spin,
        Gate::Volume,
        Gate::Entropy,
        Gate::Firewall,
        Gate::Backup,
        Gate::Consensus,
        Gate::Veto,
    ];

    /// Return the bitmask for this gate.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spin => write!(f, "SPIN"),
            Self::Volume => write!(f, "VOLUME"),
            Self::Entropy => write!(f, "ENTROPY"),
            Self::Firewall => write!(f, "FIREWALL"),
            Self::Backup => write!(f, "BACKUP"),
            Self::Consensus => write!(f, "CONSENSUS"),
            Self::Veto => write!(f, "VETO"),
        }
    }
}

/// One bit per passed gate.  Bit 7 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GateMask(u8);

impl GateMask {
    /// All seven defined gates.
    pub const ALL: GateMask = GateMask(0x7F);
    /// Reserved bit; never set by the verifier.
    pub const RESERVED: u8 = 0x80;

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from raw bits; the reserved bit is dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, gate: Gate) -> bool {
        self.0 & gate.mask() != 0
    }

    #[must_use]
    pub const fn with(self, gate: Gate, passed: bool) -> Self {
        if passed {
            Self(self.0 | gate.mask())
        } else {
            self
        }
    }

    /// True iff every defined gate passed.
    pub const fn is_verified(self) -> bool {
        self.0 & Self::ALL.0 == Self::ALL.0
    }

    /// Gates that did not pass, lowest bit first.
    pub fn failed(self) -> impl Iterator<Item = Gate> {
        Gate::ALL.into_iter().filter(move |g| !self.contains(*g))
    }
}

impl fmt::Display for GateMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

// ---------------------------------------------------------------------------
// External predicates
// ---------------------------------------------------------------------------

/// The four gates whose conditions belong to the surrounding system.
pub trait GatePolicy {
    fn firewall(&self, metrics: &MetricsSnapshot) -> bool;
    fn backup(&self, metrics: &MetricsSnapshot) -> bool;
    fn consensus(&self, metrics: &MetricsSnapshot) -> bool;
    fn veto(&self, metrics: &MetricsSnapshot) -> bool;
}

impl<P: GatePolicy + ?Sized> GatePolicy for &P {
    fn firewall(&self, metrics: &MetricsSnapshot) -> bool {
        (**self).firewall(metrics)
    }
    fn backup(&self, metrics: &MetricsSnapshot) -> bool {
        (**self).backup(metrics)
    }
    fn consensus(&self, metrics: &MetricsSnapshot) -> bool {
        (**self).consensus(metrics)
    }
    fn veto(&self, metrics: &MetricsSnapshot) -> bool {
        (**self).veto(metrics)
    }
}

/// Signature of one injected gate predicate.
pub type GatePredicate = fn(&MetricsSnapshot) -> bool;

/// Predicate table: one plain function per external gate.
#[derive(Debug, Clone, Copy)]
pub struct ExternalGates {
    pub firewall: GatePredicate,
    pub backup: GatePredicate,
    pub consensus: GatePredicate,
    pub veto: GatePredicate,
}

fn deny(_: &MetricsSnapshot) -> bool {
    false
}

impl ExternalGates {
    /// Table that rejects all four gates.  An unconfigured system can
    /// therefore never verify.
    pub const DENY_ALL: ExternalGates = ExternalGates {
        firewall: deny,
        backup: deny,
        consensus: deny,
        veto: deny,
    };
}

impl Default for ExternalGates {
    fn default() -> Self {
        Self::DENY_ALL
    }
}

impl GatePolicy for ExternalGates {
    fn firewall(&self, metrics: &MetricsSnapshot) -> bool {
        (self.firewall)(metrics)
    }
    fn backup(&self, metrics: &MetricsSnapshot) -> bool {
        (self.backup)(metrics)
    }
    fn consensus(&self, metrics: &MetricsSnapshot) -> bool {
        (self.consensus)(metrics)
    }
    fn veto(&self, metrics: &MetricsSnapshot) -> bool {
        (self.veto)(metrics)
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

pub fn spin_ok(metrics: &MetricsSnapshot) -> bool {
    (metrics.spin - 1.0).abs() < SPIN_TOLERANCE
}

pub fn volume_ok(metrics: &MetricsSnapshot) -> bool {
    metrics.coherence_volume > COHERENCE_VOLUME_REFERENCE
}

pub fn entropy_ok(metrics: &MetricsSnapshot) -> bool {
    (metrics.entropy - LN_2).abs() < ENTROPY_TOLERANCE
}

/// Evaluate all seven gates.  Returns the mask and whether every gate passed.
pub fn verify(metrics: &MetricsSnapshot, policy: &impl GatePolicy) -> (GateMask, bool) {
    let mask = GateMask::empty()
        .with(Gate::Spin, spin_ok(metrics))
        .with(Gate::Volume, volume_ok(metrics))
        .with(Gate::Entropy, entropy_ok(metrics))
        .with(Gate::Firewall, policy.firewall(metrics))
        .with(Gate::Backup, policy.backup(metrics))
        .with(Gate::Consensus, policy.consensus(metrics))
        .with(Gate::Veto, policy.veto(metrics));
    (mask, mask.is_verified())
}

/// Verifier bound to a fixed external policy.
#[derive(Debug, Clone, Default)]
pub struct GateVerifier<P> {
    policy: P,
}

impl<P: GatePolicy> GateVerifier<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn verify(&self, metrics: &MetricsSnapshot) -> (GateMask, bool) {
        verify(metrics, &self.policy)
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}
