//! State machine module root.
//!
//! The elevator has a single operating-state machine; see [`controller`].

pub mod controller;

pub use controller::ElevatorController;
