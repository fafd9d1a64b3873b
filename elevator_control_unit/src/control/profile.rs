//! Trapezoidal profile generator.
//!
//! Point-to-point, one dimension, zero velocity at both ends. The profile
//! accelerates at `a_max`, cruises at `v_max`, and decelerates symmetrically.
//! When the distance is too short to reach `v_max` the cruise phase vanishes
//! and the profile is triangular with `v_peak = sqrt(|d| × a_max)`.
//!
//! ```text
//!   v
//!   │    ┌────────────┐        v_peak
//!   │   /              \
//!   │  /                \
//!   │ /                  \
//!   └─────────────────────────► t
//!     t_a     t_c        t_a
//! ```
//!
//! Profiles are immutable once created and are sampled with an elapsed time
//! measured from the start of the move.

use std::time::Duration;

use elevator_common::elevator::error::ElevatorError;
use elevator_common::motion::{KinematicConstraints, MotionState};

/// Phase of a profile at a given elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePhase {
    /// Ramping up to peak velocity.
    Accelerate,
    /// Constant peak velocity.
    Cruise,
    /// Ramping down to rest.
    Decelerate,
    /// At the goal, at rest.
    Settled,
}

/// A time-parameterized trapezoidal trajectory from `start` to `goal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    constraints: KinematicConstraints,
    start: MotionState,
    goal: MotionState,
    /// +1, −1, or 0 for a zero-length move.
    direction: f64,
    accel_duration: f64,
    cruise_duration: f64,
    peak_velocity: f64,
}

impl Profile {
    /// Plan a move from `start` to `goal`.
    ///
    /// Only positions are used; boundary velocities are zero.
    ///
    /// # Errors
    /// `ElevatorError::InvalidConstraints` if either limit is non-positive or
    /// non-finite.
    pub fn create(
        constraints: KinematicConstraints,
        start: MotionState,
        goal: MotionState,
    ) -> Result<Self, ElevatorError> {
        constraints.validate()?;

        let v_max = constraints.max_velocity;
        let a_max = constraints.max_acceleration;
        let distance = goal.position - start.position;
        let abs_distance = distance.abs();

        let direction = if distance > 0.0 {
            1.0
        } else if distance < 0.0 {
            -1.0
        } else {
            0.0
        };

        let mut accel_duration = constraints.time_to_max_velocity();
        // Distance covered by the full accel + decel ramps.
        let ramp_distance = v_max * accel_duration;

        let (peak_velocity, cruise_duration) = if ramp_distance >= abs_distance {
            let v_peak = (abs_distance * a_max).sqrt();
            accel_duration = v_peak / a_max;
            (v_peak, 0.0)
        } else {
            (v_max, (abs_distance - ramp_distance) / v_max)
        };

        Ok(Self {
            constraints,
            start: MotionState::at_rest(start.position),
            goal: MotionState::at_rest(goal.position),
            direction,
            accel_duration,
            cruise_duration,
            peak_velocity,
        })
    }

    /// Reference position and velocity `elapsed` seconds into the move.
    ///
    /// Negative or NaN elapsed time yields `start`; anything at or beyond
    /// [`total_duration`](Self::total_duration) yields `goal` at rest.
    pub fn sample(&self, elapsed: f64) -> MotionState {
        let t = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };
        let a = self.constraints.max_acceleration;
        let dir = self.direction;
        let t_a = self.accel_duration;
        let total = self.total_duration();

        match self.phase(t) {
            ProfilePhase::Settled => self.goal,
            _ if t == 0.0 => self.start,
            ProfilePhase::Accelerate => MotionState::new(
                self.start.position + dir * 0.5 * a * t * t,
                dir * a * t,
            ),
            ProfilePhase::Cruise => MotionState::new(
                self.start.position
                    + dir * (0.5 * a * t_a * t_a + self.peak_velocity * (t - t_a)),
                dir * self.peak_velocity,
            ),
            ProfilePhase::Decelerate => {
                let remaining = total - t;
                MotionState::new(
                    self.goal.position - dir * 0.5 * a * remaining * remaining,
                    dir * a * remaining,
                )
            }
        }
    }

    /// [`sample`](Self::sample) with a `Duration` clock.
    #[inline]
    pub fn sample_at(&self, elapsed: Duration) -> MotionState {
        self.sample(elapsed.as_secs_f64())
    }

    /// Reference acceleration at `elapsed`, for acceleration feedforward.
    pub fn acceleration(&self, elapsed: f64) -> f64 {
        let t = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };
        let a = self.constraints.max_acceleration;
        match self.phase(t) {
            ProfilePhase::Accelerate => self.direction * a,
            ProfilePhase::Decelerate => -self.direction * a,
            ProfilePhase::Cruise | ProfilePhase::Settled => 0.0,
        }
    }

    /// Phase at `elapsed` (clamped like [`sample`](Self::sample)).
    pub fn phase(&self, elapsed: f64) -> ProfilePhase {
        let t = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };
        let t_a = self.accel_duration;
        if t >= self.total_duration() {
            ProfilePhase::Settled
        } else if t < t_a {
            ProfilePhase::Accelerate
        } else if t < t_a + self.cruise_duration {
            ProfilePhase::Cruise
        } else {
            ProfilePhase::Decelerate
        }
    }

    /// True once `elapsed` has reached the end of the move.
    #[inline]
    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.total_duration()
    }

    /// Accel + cruise + decel [s].
    #[inline]
    pub fn total_duration(&self) -> f64 {
        2.0 * self.accel_duration + self.cruise_duration
    }

    /// Length of the acceleration phase [s]; the deceleration phase is equal.
    #[inline]
    pub fn accel_duration(&self) -> f64 {
        self.accel_duration
    }

    /// Length of the cruise phase [s]; zero for triangular profiles.
    #[inline]
    pub fn cruise_duration(&self) -> f64 {
        self.cruise_duration
    }

    /// Highest speed reached [units/s].
    #[inline]
    pub fn peak_velocity(&self) -> f64 {
        self.peak_velocity
    }

    /// True if the move never reaches `max_velocity`.
    #[inline]
    pub fn is_triangular(&self) -> bool {
        self.cruise_duration == 0.0
    }

    #[inline]
    pub fn start(&self) -> MotionState {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> MotionState {
        self.goal
    }

    #[inline]
    pub fn constraints(&self) -> KinematicConstraints {
        self.constraints
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
