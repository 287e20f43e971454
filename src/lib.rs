//! Temporal interferometer driver library.
//!
//! Register access, the acquisition sequencer, the spin decoder, the gate
//! verifier and emergency containment, plus the service that ties one
//! acquisition cycle together.  Everything runs on the host against
//! [`drivers::sim::SimRegisters`]; on hardware the same code drives
//! [`drivers::registers::MmioRegisters`].

#![deny(unused_must_use)]

pub mod acquisition;
pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod metrics;
pub mod regmap;
pub mod safety;

pub use acquisition::decoder::MeasurementOutcome;
pub use acquisition::{DeviceState, Sequencer};
pub use error::{AcquireError, Error};
pub use metrics::{AmbientMetrics, MetricsSnapshot, RawSample};
pub use safety::{Gate, GateMask, GatePolicy, verify};
