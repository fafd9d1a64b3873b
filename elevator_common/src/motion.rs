//! Kinematic constraints and reference motion states.
//!
//! Both actuators of the elevator share one [`KinematicConstraints`] value;
//! they must move identically.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ACCELERATION_DEFAULT, MAX_VELOCITY_DEFAULT};
use crate::elevator::error::ElevatorError;

/// Velocity and acceleration limits of a trapezoidal profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicConstraints {
    /// Maximum velocity magnitude [units/s]. Must be > 0.
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,
    /// Maximum acceleration magnitude [units/s²]. Must be > 0.
    #[serde(default = "default_max_acceleration")]
    pub max_acceleration: f64,
}

fn default_max_velocity() -> f64 {
    MAX_VELOCITY_DEFAULT
}
fn default_max_acceleration() -> f64 {
    MAX_ACCELERATION_DEFAULT
}

impl KinematicConstraints {
    /// Create constraints without validating them.
    pub const fn new(max_velocity: f64, max_acceleration: f64) -> Self {
        Self {
            max_velocity,
            max_acceleration,
        }
    }

    /// Check that both limits are finite and strictly positive.
    pub fn validate(&self) -> Result<(), ElevatorError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.max_velocity) && ok(self.max_acceleration) {
            Ok(())
        } else {
            Err(ElevatorError::InvalidConstraints {
                max_velocity: self.max_velocity,
                max_acceleration: self.max_acceleration,
            })
        }
    }

    /// Time needed to reach `max_velocity` from rest [s].
    #[inline]
    pub fn time_to_max_velocity(&self) -> f64 {
        self.max_velocity / self.max_acceleration
    }
}

impl Default for KinematicConstraints {
    fn default() -> Self {
        Self::new(MAX_VELOCITY_DEFAULT, MAX_ACCELERATION_DEFAULT)
    }
}

/// Instantaneous reference: position and velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    /// Position [units].
    pub position: f64,
    /// Velocity [units/s].
    pub velocity: f64,
}

impl MotionState {
    /// Create a motion state.
    pub const fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }

    /// A state at rest at `position`.
    pub const fn at_rest(position: f64) -> Self {
        Self {
            position,
            velocity: 0.0,
        }
    }
}
