//! Simulated two-motor elevator.
//!
//! Implements `ActuatorDevice` on top of two [`MotorSimulator`]s, one per
//! side. The motor whose polarity is inverted is also mounted inverted, so a
//! correctly polarised command raises both.
//!
//! Time advances either explicitly through [`SimulatedElevator::step`] or,
//! in wall-clock mode, by the time elapsed since the previous device call.

use std::time::{Duration, Instant};

use elevator_common::elevator::config::ActuatorConfig;
use elevator_common::elevator::error::ElevatorError;
use elevator_common::elevator::state::Side;
use elevator_common::hal::ActuatorDevice;
use tracing::{debug, info, warn};

use super::motor::{LoopGains, MotorCommand, MotorSimulator};
use super::params::SimulationParams;

/// How simulated time advances.
#[derive(Debug, Clone, Copy)]
enum SimClock {
    /// Only [`SimulatedElevator::step`] advances time.
    Manual,
    /// Every device call advances time to `Instant::now()`.
    WallClock { last: Instant },
}

#[derive(Debug, Clone, Copy, Default)]
struct LinkState {
    down: bool,
    failing_reads: u32,
}

/// Simulated elevator backend.
pub struct SimulatedElevator {
    motors: [MotorSimulator; 2],
    links: [LinkState; 2],
    clock: SimClock,
    ticks_simulated: u64,
}

impl SimulatedElevator {
    /// Create a simulation advanced only by [`step`](Self::step).
    pub fn new(actuators: &ActuatorConfig, params: SimulationParams) -> Self {
        let gains = LoopGains {
            kp: actuators.kp,
            kd: actuators.kd,
            peak_output: actuators.peak_output,
        };
        let polarity = actuators.polarity();
        let motors = Side::BOTH.map(|side| {
            MotorSimulator::new(polarity[side.index()].sign(), gains, params)
        });
        info!(
            inverted = %actuators.inverted_side,
            initial = params.initial_position,
            "simulated elevator created"
        );
        Self {
            motors,
            links: [LinkState::default(); 2],
            clock: SimClock::Manual,
            ticks_simulated: 0,
        }
    }

    /// Create a simulation that follows wall-clock time.
    pub fn realtime(actuators: &ActuatorConfig, params: SimulationParams) -> Self {
        let mut sim = Self::new(actuators, params);
        sim.clock = SimClock::WallClock {
            last: Instant::now(),
        };
        sim
    }

    /// Advance both motors by `dt`.
    pub fn step(&mut self, dt: Duration) {
        let dt_s = dt.as_secs_f64();
        for motor in &mut self.motors {
            motor.update(dt_s);
        }
        self.ticks_simulated += 1;
    }

    fn sync_clock(&mut self) {
        if let SimClock::WallClock { last } = self.clock {
            let now = Instant::now();
            let dt = now.saturating_duration_since(last);
            if !dt.is_zero() {
                self.step(dt);
            }
            self.clock = SimClock::WallClock { last: now };
        }
    }

    fn check_link(&self, side: Side) -> Result<(), ElevatorError> {
        if self.links[side.index()].down {
            Err(ElevatorError::DeviceUnavailable { side })
        } else {
            Ok(())
        }
    }

    // ─── Fault Injection ────────────────────────────────────────────

    /// Take the link of `side` down or bring it back up.
    pub fn set_link_available(&mut self, side: Side, available: bool) {
        let link = &mut self.links[side.index()];
        if link.down == available {
            if available {
                info!(%side, "simulated link restored");
            } else {
                warn!(%side, "simulated link down");
            }
        }
        link.down = !available;
    }

    /// Make the next `count` position reads of `side` fail.
    pub fn fail_next_reads(&mut self, side: Side, count: u32) {
        debug!(%side, count, "injecting read failures");
        self.links[side.index()].failing_reads = count;
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Last command received by `side`, device frame.
    pub fn last_command(&self, side: Side) -> MotorCommand {
        self.motors[side.index()].command()
    }

    /// Carriage height reported by `side`'s motor, logical frame.
    pub fn height(&self, side: Side) -> f64 {
        self.motors[side.index()].height()
    }

    /// Velocity of `side`, logical frame.
    pub fn velocity(&self, side: Side) -> f64 {
        self.motors[side.index()].climb_rate()
    }

    /// Number of [`step`](Self::step) calls so far.
    pub fn ticks_simulated(&self) -> u64 {
        self.ticks_simulated
    }

    /// Place the carriage at `height` with both motors at rest.
    pub fn set_height(&mut self, height: f64) {
        for motor in &mut self.motors {
            motor.set_height(height);
        }
    }
}

impl ActuatorDevice for SimulatedElevator {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn read_position(&mut self, side: Side) -> Result<f64, ElevatorError> {
        self.sync_clock();
        self.check_link(side)?;
        let link = &mut self.links[side.index()];
        if link.failing_reads > 0 {
            link.failing_reads -= 1;
            return Err(ElevatorError::DeviceUnavailable { side });
        }
        Ok(self.motors[side.index()].position())
    }

    fn write_open_loop(&mut self, side: Side, effort: f64) -> Result<(), ElevatorError> {
        self.sync_clock();
        self.check_link(side)?;
        self.motors[side.index()].set_command(MotorCommand::OpenLoop(effort));
        Ok(())
    }

    fn write_closed_loop(
        &mut self,
        side: Side,
        position_ref: f64,
        feedforward: f64,
    ) -> Result<(), ElevatorError> {
        self.sync_clock();
        self.check_link(side)?;
        self.motors[side.index()].set_command(MotorCommand::ClosedLoop {
            reference: position_ref,
            feedforward,
        });
        Ok(())
    }
}
