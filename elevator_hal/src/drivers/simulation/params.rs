//! Simulation parameters, read from the optional `[simulation]` table.
//!
//! ```toml
//! [simulation]
//! free_speed = 98.0
//! time_constant_s = 0.05
//! gravity_effort = 0.16
//! min_travel = -1.0
//! max_travel = 60.0
//! ```

use std::path::Path;

use elevator_common::config::ConfigLoader;
use elevator_common::hal::HalError;
use serde::Deserialize;

/// Physical model of the simulated elevator.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Unloaded speed at full effort [units/s].
    pub free_speed: f64,
    /// Mechanical time constant [s].
    pub time_constant_s: f64,
    /// Constant effort the load exerts, logical frame.
    /// Feedforward `kg = -gravity_effort` cancels it.
    pub gravity_effort: f64,
    /// Lower hard stop [units].
    pub min_travel: f64,
    /// Upper hard stop [units].
    pub max_travel: f64,
    /// Height at startup [units].
    pub initial_position: f64,
    /// Integration step [s].
    pub substep_s: f64,
    /// Motor shorts its windings on zero open-loop effort.
    pub brake_on_neutral: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            free_speed: 98.0,
            time_constant_s: 0.05,
            gravity_effort: 0.16,
            min_travel: -1.0,
            max_travel: 60.0,
            initial_position: 0.0,
            substep_s: 0.001,
            brake_on_neutral: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SimulationFile {
    #[serde(default)]
    simulation: SimulationParams,
}

impl SimulationParams {
    /// Read the `[simulation]` table of an elevator config file.
    /// Missing table or fields fall back to defaults.
    pub fn from_config_file(path: &Path) -> Result<Self, HalError> {
        let file =
            SimulationFile::load(path).map_err(|e| HalError::ConfigError(e.to_string()))?;
        file.simulation.validate()?;
        Ok(file.simulation)
    }

    /// Check physical plausibility.
    pub fn validate(&self) -> Result<(), HalError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.free_speed) || !positive(self.time_constant_s) {
            return Err(HalError::ConfigError(
                "simulation.free_speed and simulation.time_constant_s must be > 0".to_string(),
            ));
        }
        if !positive(self.substep_s) || self.substep_s > self.time_constant_s {
            return Err(HalError::ConfigError(format!(
                "simulation.substep_s {} must be in (0, time_constant_s]",
                self.substep_s
            )));
        }
        if !self.gravity_effort.is_finite() || self.gravity_effort.abs() > 1.0 {
            return Err(HalError::ConfigError(
                "simulation.gravity_effort must be within [-1, 1]".to_string(),
            ));
        }
        if !(self.min_travel < self.max_travel)
            || !(self.min_travel..=self.max_travel).contains(&self.initial_position)
        {
            return Err(HalError::ConfigError(format!(
                "simulation travel [{}, {}] must be ordered and contain initial_position {}",
                self.min_travel, self.max_travel, self.initial_position
            )));
        }
        Ok(())
    }
}
