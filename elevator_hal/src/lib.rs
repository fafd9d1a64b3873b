//! # Elevator HAL Library
//!
//! Actuator backends for the elevator control core. Backends implement the
//! `ActuatorDevice` trait defined in `elevator_common::hal::device` and are
//! created by name through the [`DriverRegistry`].
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Backend implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────┐
//! │ elevator_control_unit│─────►│  DriverRegistry  │
//! │  (ActuatorPair)      │      └────────┬─────────┘
//! └──────────┬───────────┘               │ create_driver("simulation")
//!            │ ActuatorDevice            ▼
//!            └──────────────────► SimulatedElevator
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::{SimulatedElevator, SimulationParams};
