//! Actuator pair: two physically-ganged motors behind one device.
//!
//! The two motors face each other, so exactly one of them runs with inverted
//! polarity. Everything above this module works in the **logical frame**
//! (positive = up); every value crossing into the device is multiplied by the
//! side's polarity sign, and every sensed position on the way back.

use elevator_common::elevator::config::ActuatorConfig;
use elevator_common::elevator::error::ElevatorError;
use elevator_common::elevator::state::{Polarity, Side};
use elevator_common::hal::ActuatorDevice;
use tracing::trace;

/// Closed-loop command for one side, logical frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorCommand {
    /// Position the on-board loop should track [units].
    pub position_reference: f64,
    /// Effort added on top of the loop output.
    pub feedforward_effort: f64,
}

impl ActuatorCommand {
    /// Create a command.
    pub const fn new(position_reference: f64, feedforward_effort: f64) -> Self {
        Self {
            position_reference,
            feedforward_effort,
        }
    }
}

/// Two actuators with fixed, opposite polarity.
pub struct ActuatorPair<D: ActuatorDevice> {
    device: D,
    polarity: [Polarity; 2],
    /// Logical reference of the last closed-loop command, per side.
    last_reference: [Option<f64>; 2],
}

impl<D: ActuatorDevice> ActuatorPair<D> {
    /// Wrap `device` with per-side polarity (indexed by [`Side::index`]).
    ///
    /// # Errors
    /// `ElevatorError::InvalidPolarity` unless exactly one side is inverted.
    pub fn new(device: D, polarity: [Polarity; 2]) -> Result<Self, ElevatorError> {
        if polarity[0] == polarity[1] {
            return Err(ElevatorError::InvalidPolarity);
        }
        Ok(Self {
            device,
            polarity,
            last_reference: [None; 2],
        })
    }

    /// Wrap `device` using the configured inverted side.
    pub fn from_config(device: D, config: &ActuatorConfig) -> Self {
        Self {
            device,
            polarity: config.polarity(),
            last_reference: [None; 2],
        }
    }

    /// Polarity of `side`.
    #[inline]
    pub fn polarity(&self, side: Side) -> Polarity {
        self.polarity[side.index()]
    }

    #[inline]
    fn sign(&self, side: Side) -> f64 {
        self.polarity[side.index()].sign()
    }

    /// Sensed position of `side`, logical frame.
    pub fn current_position(&mut self, side: Side) -> Result<f64, ElevatorError> {
        let raw = self.device.read_position(side)?;
        Ok(raw * self.sign(side))
    }

    /// Drive both sides open-loop with the same logical effort.
    pub fn command_open_loop(&mut self, effort: f64) -> Result<(), ElevatorError> {
        for side in Side::BOTH {
            self.device.write_open_loop(side, effort * self.sign(side))?;
            self.last_reference[side.index()] = None;
        }
        trace!(effort, "open-loop command");
        Ok(())
    }

    /// Hand `side` a closed-loop reference plus feedforward.
    pub fn command_closed_loop(
        &mut self,
        side: Side,
        command: ActuatorCommand,
    ) -> Result<(), ElevatorError> {
        let s = self.sign(side);
        self.device.write_closed_loop(
            side,
            command.position_reference * s,
            command.feedforward_effort * s,
        )?;
        self.last_reference[side.index()] = Some(command.position_reference);
        Ok(())
    }

    /// Both sides closed-loop to the same reference, no feedforward.
    pub fn command_same_setpoint(&mut self, position: f64) -> Result<(), ElevatorError> {
        for side in Side::BOTH {
            self.command_closed_loop(side, ActuatorCommand::new(position, 0.0))?;
        }
        Ok(())
    }

    /// Logical reference last sent closed-loop to `side`, `None` after an
    /// open-loop command.
    #[inline]
    pub fn last_reference(&self, side: Side) -> Option<f64> {
        self.last_reference[side.index()]
    }

    /// The underlying device.
    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The underlying device, mutably (fault injection, simulation stepping).
    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
