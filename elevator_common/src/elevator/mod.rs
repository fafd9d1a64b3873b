//! Elevator shared types.
//!
//! Everything exchanged between the control unit, the HAL and the command
//! dispatch layer lives here, organized by domain: operating states and
//! requests, the error taxonomy, configuration tables, and telemetry.

pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
