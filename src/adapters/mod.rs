//! Adapters: concrete implementations of the port traits.

pub mod log_sink;
