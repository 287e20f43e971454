//! Register access, the host simulation backend and emergency containment.

pub mod containment;
pub mod registers;
pub mod sim;
