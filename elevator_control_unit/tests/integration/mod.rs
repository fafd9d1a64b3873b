//! Shared fixtures for the integration tests.

mod device_faults;
mod profile_motion;
mod simulated_run;
mod transitions;

use elevator_common::elevator::error::ElevatorError;
use elevator_common::elevator::state::Side;
use elevator_common::hal::ActuatorDevice;

/// One write received by [`RecordingDevice`], device frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Write {
    Open(Side, f64),
    Closed(Side, f64, f64),
}

/// Device with settable positions that records every write.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub positions: [f64; 2],
    pub writes: Vec<Write>,
    /// Link down: reads and writes fail.
    pub down: [bool; 2],
    /// Writes fail, reads still succeed.
    pub reject_writes: [bool; 2],
}

impl RecordingDevice {
    /// Device reporting `height` on both sides with the right side inverted.
    pub fn at_height(height: f64) -> Self {
        Self {
            positions: [height, -height],
            ..Self::default()
        }
    }

    /// Writes received since the last call.
    pub fn take_writes(&mut self) -> Vec<Write> {
        std::mem::take(&mut self.writes)
    }

    fn check(&self, side: Side) -> Result<(), ElevatorError> {
        if self.down[side.index()] {
            Err(ElevatorError::DeviceUnavailable { side })
        } else {
            Ok(())
        }
    }

    fn check_write(&self, side: Side) -> Result<(), ElevatorError> {
        self.check(side)?;
        if self.reject_writes[side.index()] {
            return Err(ElevatorError::DeviceUnavailable { side });
        }
        Ok(())
    }
}

impl ActuatorDevice for RecordingDevice {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn read_position(&mut self, side: Side) -> Result<f64, ElevatorError> {
        self.check(side)?;
        Ok(self.positions[side.index()])
    }

    fn write_open_loop(&mut self, side: Side, effort: f64) -> Result<(), ElevatorError> {
        self.check_write(side)?;
        self.writes.push(Write::Open(side, effort));
        Ok(())
    }

    fn write_closed_loop(
        &mut self,
        side: Side,
        position_ref: f64,
        feedforward: f64,
    ) -> Result<(), ElevatorError> {
        self.check_write(side)?;
        self.writes.push(Write::Closed(side, position_ref, feedforward));
        Ok(())
    }
}
