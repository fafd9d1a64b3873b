//! Simulation backend.
//!
//! A physics model of the two-motor elevator for development and testing
//! without hardware. Supports fault injection on either side's link.

mod driver;
mod motor;
mod params;

pub use driver::SimulatedElevator;
pub use motor::{LoopGains, MotorCommand, MotorSimulator};
pub use params::SimulationParams;

use elevator_common::hal::{ActuatorDevice, DriverContext, HalError};
use tracing::debug;

/// Factory function creating a wall-clock simulation.
///
/// Reads the optional `[simulation]` table from `ctx.config_path`.
pub fn create_driver(ctx: &DriverContext) -> Result<Box<dyn ActuatorDevice>, HalError> {
    let params = match &ctx.config_path {
        Some(path) => SimulationParams::from_config_file(path)?,
        None => {
            debug!("no config file, using default simulation parameters");
            SimulationParams::default()
        }
    };
    Ok(Box::new(SimulatedElevator::realtime(&ctx.actuators, params)))
}
