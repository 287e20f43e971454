//! Application core: pure cycle orchestration, zero direct I/O.
//!
//! Ties the sequencer and the gate verifier into one acquisition cycle.
//! Everything owned by the surrounding system (ambient metrics, the
//! decision layer, event delivery) is reached through the port traits in
//! [`ports`], keeping this layer testable without real hardware.

pub mod events;
pub mod ports;
pub mod service;
