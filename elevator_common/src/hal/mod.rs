//! Hardware abstraction boundary.
//!
//! - [`device`] - The `ActuatorDevice` trait, driver factory types and `HalError`

pub mod device;

pub use device::{ActuatorDevice, DriverContext, DriverFactory, HalError};
