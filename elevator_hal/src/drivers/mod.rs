//! Actuator backend implementations.
//!
//! - [`simulation`] - Physics simulation of the two-motor elevator
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `ActuatorDevice` from `elevator_common::hal::device`
//! 3. Register its factory in [`register_all_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register every built-in backend.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    // Names are unique within this list, so registration cannot collide.
    let _ = registry.register("simulation", simulation::create_driver);
}
