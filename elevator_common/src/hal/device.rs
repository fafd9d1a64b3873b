//! Actuator device trait.
//!
//! The control core talks to the two elevator motors only through this trait,
//! enabling pluggable backends (simulation, CAN motor controllers, test
//! doubles). Values crossing it are in the **device frame**: polarity has
//! already been applied by the caller.
//!
//! # Timing Contracts
//!
//! | Operation | RT Constraint |
//! |-----------|---------------|
//! | `read_position()` | must not block |
//! | `write_open_loop()` | must not block |
//! | `write_closed_loop()` | must not block |

use std::path::PathBuf;

use thiserror::Error;

use crate::elevator::config::ActuatorConfig;
use crate::elevator::error::ElevatorError;
use crate::elevator::state::Side;

/// Errors raised while creating a device backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalError {
    /// No backend registered under that name.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Backend-specific configuration rejected.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Backend failed to come up.
    #[error("Initialization failed: {0}")]
    InitFailed(String),
}

/// Everything a backend factory may need at startup.
#[derive(Debug, Clone, Default)]
pub struct DriverContext {
    /// Closed-loop gains and polarity handed to the motor controllers.
    pub actuators: ActuatorConfig,
    /// Config file the elevator was started with, for backend-specific tables.
    pub config_path: Option<PathBuf>,
}

/// Factory function type for creating device instances.
pub type DriverFactory = fn(&DriverContext) -> Result<Box<dyn ActuatorDevice>, HalError>;

/// Interface of a two-motor actuator backend.
pub trait ActuatorDevice {
    /// Backend identifier for logging (e.g. "simulation").
    fn name(&self) -> &'static str;

    /// Latest sensed position of `side`.
    ///
    /// # Errors
    /// `ElevatorError::DeviceUnavailable` if the link to that side is down.
    fn read_position(&mut self, side: Side) -> Result<f64, ElevatorError>;

    /// Drive `side` open-loop with `effort` (fraction of full output).
    ///
    /// # Errors
    /// `ElevatorError::DeviceUnavailable` if the link to that side is down.
    fn write_open_loop(&mut self, side: Side, effort: f64) -> Result<(), ElevatorError>;

    /// Hand `side` a position reference plus arbitrary feedforward for its
    /// on-board closed loop.
    ///
    /// # Errors
    /// `ElevatorError::DeviceUnavailable` if the link to that side is down.
    fn write_closed_loop(
        &mut self,
        side: Side,
        position_ref: f64,
        feedforward: f64,
    ) -> Result<(), ElevatorError>;
}

impl<T: ActuatorDevice + ?Sized> ActuatorDevice for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read_position(&mut self, side: Side) -> Result<f64, ElevatorError> {
        (**self).read_position(side)
    }

    fn write_open_loop(&mut self, side: Side, effort: f64) -> Result<(), ElevatorError> {
        (**self).write_open_loop(side, effort)
    }

    fn write_closed_loop(
        &mut self,
        side: Side,
        position_ref: f64,
        feedforward: f64,
    ) -> Result<(), ElevatorError> {
        (**self).write_closed_loop(side, position_ref, feedforward)
    }
}
