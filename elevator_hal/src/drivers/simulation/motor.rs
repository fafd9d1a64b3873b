//! Single-motor physics simulator.
//!
//! First-order DC motor model in the device frame:
//!
//! ```text
//! dv/dt = (free_speed × (u + load) − v) / time_constant
//! dp/dt = v
//! ```
//!
//! `u` is the applied effort in [-1, 1]. In closed-loop mode it is computed
//! the way a smart motor controller does on-board:
//! `u = clamp(kp × (r − p) − kd × v, ±peak) + ff`, then clamped to ±1.

use tracing::trace;

use super::params::SimulationParams;

/// Last command received by a motor, device frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorCommand {
    /// Constant effort.
    OpenLoop(f64),
    /// On-board position loop.
    ClosedLoop {
        /// Position reference [units].
        reference: f64,
        /// Arbitrary feedforward added after the loop output.
        feedforward: f64,
    },
}

impl Default for MotorCommand {
    fn default() -> Self {
        Self::OpenLoop(0.0)
    }
}

/// On-board closed-loop gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopGains {
    /// Proportional gain [effort/unit].
    pub kp: f64,
    /// Derivative gain [effort·s/unit].
    pub kd: f64,
    /// Clamp on the loop output before feedforward.
    pub peak_output: f64,
}

/// Physics of one motor and its gearbox.
#[derive(Debug, Clone)]
pub struct MotorSimulator {
    /// Current position, device frame [units].
    position: f64,
    /// Current velocity, device frame [units/s].
    velocity: f64,
    /// +1 if positive device effort raises the carriage, −1 otherwise.
    mount_sign: f64,
    command: MotorCommand,
    gains: LoopGains,
    params: SimulationParams,
}

impl MotorSimulator {
    /// Create a motor at the configured initial height.
    pub fn new(mount_sign: f64, gains: LoopGains, params: SimulationParams) -> Self {
        Self {
            position: mount_sign * params.initial_position,
            velocity: 0.0,
            mount_sign,
            command: MotorCommand::default(),
            gains,
            params,
        }
    }

    /// Replace the active command.
    #[inline]
    pub fn set_command(&mut self, command: MotorCommand) {
        self.command = command;
    }

    /// The active command.
    #[inline]
    pub fn command(&self) -> MotorCommand {
        self.command
    }

    /// Position, device frame.
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Velocity, device frame.
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Carriage height this motor implies, logical frame.
    #[inline]
    pub fn height(&self) -> f64 {
        self.mount_sign * self.position
    }

    /// Velocity of the carriage this motor implies, logical frame.
    #[inline]
    pub fn climb_rate(&self) -> f64 {
        self.mount_sign * self.velocity
    }

    /// Place the motor at `height` (logical frame), at rest.
    pub fn set_height(&mut self, height: f64) {
        self.position = self.mount_sign * height;
        self.velocity = 0.0;
    }

    /// Advance the model by `dt_s` seconds in fixed substeps.
    pub fn update(&mut self, dt_s: f64) {
        if dt_s <= 0.0 {
            return;
        }
        let substep = self.params.substep_s;
        let mut remaining = dt_s;
        while remaining > 0.0 {
            let h = remaining.min(substep);
            self.integrate(h);
            remaining -= h;
        }
        trace!(
            "motor: pos={:.4}, vel={:.4}, cmd={:?}",
            self.position, self.velocity, self.command
        );
    }

    /// Effort the motor controller applies right now.
    pub fn applied_effort(&self) -> f64 {
        match self.command {
            MotorCommand::OpenLoop(u) => u.clamp(-1.0, 1.0),
            MotorCommand::ClosedLoop {
                reference,
                feedforward,
            } => {
                let g = &self.gains;
                let loop_out = (g.kp * (reference - self.position) - g.kd * self.velocity)
                    .clamp(-g.peak_output, g.peak_output);
                (loop_out + feedforward).clamp(-1.0, 1.0)
            }
        }
    }

    fn integrate(&mut self, h: f64) {
        let p = &self.params;
        let braking = p.brake_on_neutral && self.command == MotorCommand::OpenLoop(0.0);
        let drive = if braking {
            0.0
        } else {
            let load = self.mount_sign * p.gravity_effort;
            p.free_speed * (self.applied_effort() + load)
        };

        let accel = (drive - self.velocity) / p.time_constant_s;
        self.velocity += accel * h;
        self.position += self.velocity * h;
        self.clamp_travel();
    }

    /// Hard stops at the ends of travel.
    fn clamp_travel(&mut self) {
        let height = self.height();
        let (lo, hi) = (self.params.min_travel, self.params.max_travel);
        if height < lo || height > hi {
            self.set_height(height.clamp(lo, hi));
        }
    }
}
