//! Elevator operating-state machine.
//!
//! States: `Idle`, `HoldSetpoint(target)`, `ProfiledMove(goal)`. Initial
//! state is `Idle`; its entry command is issued on the first tick.
//!
//! Requests only record the *requested* state, except that a request for a
//! state other than the applied one drops the in-flight move right away.
//! Each [`tick`] compares the requested state against the *applied* state
//! and runs entry actions on the tick where they differ, so every distinct
//! transition fires its entry exactly once:
//!
//! | Entering | Entry action |
//! |----------|--------------|
//! | `Idle` | open-loop zero effort on both sides |
//! | `HoldSetpoint` | same closed-loop setpoint on both sides, no feedforward |
//! | `ProfiledMove` | build one profile per side from its sensed position, start clock |
//!
//! While in `ProfiledMove`, every tick samples both profiles at the elapsed
//! wall time and sends each side its reference plus feedforward. Reaching the
//! goal does not change state.
//!
//! A tick whose sensor reads fail skips all commanding and leaves every piece
//! of state untouched. The move clock keeps running on wall time, so a move
//! resumes where it should be once the sensors come back. An entry action
//! that fails is retried on the next tick.
//!
//! [`tick`]: ElevatorController::tick

use std::time::{Duration, Instant};

use elevator_common::elevator::config::{ElevatorConfig, SetpointTable};
use elevator_common::elevator::error::{ElevatorError, TickFaults};
use elevator_common::elevator::state::{ElevatorRequest, OperatingState, SetpointRequest, Side};
use elevator_common::elevator::telemetry::{ElevatorTelemetry, SideTelemetry};
use elevator_common::hal::ActuatorDevice;
use elevator_common::motion::{KinematicConstraints, MotionState};
use tracing::{debug, info, warn};

use crate::actuator::{ActuatorCommand, ActuatorPair};
use crate::control::feedforward::Feedforward;
use crate::control::profile::Profile;

/// In-flight profiled move: one profile per side and its clock origin.
#[derive(Debug, Clone, Copy)]
struct ActiveMove {
    profiles: [Profile; 2],
    started_at: Instant,
}

impl ActiveMove {
    fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}

/// The elevator control core.
pub struct ElevatorController<D: ActuatorDevice> {
    pair: ActuatorPair<D>,
    constraints: KinematicConstraints,
    feedforward: Feedforward,
    setpoints: SetpointTable,

    requested: OperatingState,
    request_label: &'static str,
    applied: OperatingState,
    /// Entry action of `applied` still has to run.
    entry_pending: bool,
    motion: Option<ActiveMove>,

    tick_count: u64,
    anomaly_count: u64,
    /// Faults raised between ticks, reported with the next tick.
    pending_faults: TickFaults,
    /// Device faults of the previous tick, to log only on change.
    last_device_faults: TickFaults,
}

impl<D: ActuatorDevice> ElevatorController<D> {
    /// Build a controller from the configuration tables it uses.
    pub fn new(pair: ActuatorPair<D>, config: &ElevatorConfig) -> Self {
        Self::with_parts(
            pair,
            config.constraints,
            Feedforward::new(config.feedforward),
            config.setpoints,
        )
    }

    /// Build a controller from explicit parts.
    pub fn with_parts(
        pair: ActuatorPair<D>,
        constraints: KinematicConstraints,
        feedforward: Feedforward,
        setpoints: SetpointTable,
    ) -> Self {
        Self {
            pair,
            constraints,
            feedforward,
            setpoints,
            requested: OperatingState::Idle,
            request_label: ElevatorRequest::Idle.label(),
            applied: OperatingState::Idle,
            entry_pending: true,
            motion: None,
            tick_count: 0,
            anomaly_count: 0,
            pending_faults: TickFaults::empty(),
            last_device_faults: TickFaults::empty(),
        }
    }

    // ─── Requests ───────────────────────────────────────────────────

    /// Stop driving: open-loop zero.
    pub fn request_idle(&mut self) {
        self.request(ElevatorRequest::Idle);
    }

    /// Hold a named setpoint or a raw position.
    pub fn request_setpoint(&mut self, setpoint: impl Into<SetpointRequest>) {
        self.request(ElevatorRequest::Setpoint(setpoint.into()));
    }

    /// Profiled move to the bottom setpoint.
    pub fn request_retract(&mut self) {
        self.request(ElevatorRequest::Retract);
    }

    /// Record `request` as the state to apply on the next tick.
    pub fn request(&mut self, request: ElevatorRequest) {
        let state = match request {
            ElevatorRequest::Idle => OperatingState::Idle,
            ElevatorRequest::Setpoint(SetpointRequest::Named(name)) => {
                OperatingState::HoldSetpoint {
                    target: self.setpoints.resolve(name),
                }
            }
            ElevatorRequest::Setpoint(SetpointRequest::Position(target)) => {
                if !target.is_finite() {
                    warn!(position = target, "non-finite setpoint, coercing to Idle");
                    self.record_anomaly();
                    self.set_requested(OperatingState::Idle, ElevatorRequest::Idle.label());
                    return;
                }
                OperatingState::HoldSetpoint { target }
            }
            ElevatorRequest::Retract => OperatingState::ProfiledMove {
                goal: self.setpoints.bottom,
            },
        };
        self.set_requested(state, request.label());
    }

    /// Decode and record a numeric request code.
    ///
    /// Unknown codes are coerced to `Idle` and reported as
    /// `UNRECOGNIZED_STATE` on the next tick.
    pub fn request_code(&mut self, code: u8) {
        match ElevatorRequest::from_code(code) {
            Ok(request) => self.request(request),
            Err(e) => {
                warn!(code, "{e}, coercing to Idle");
                self.record_anomaly();
                self.set_requested(OperatingState::Idle, ElevatorRequest::Idle.label());
            }
        }
    }

    fn set_requested(&mut self, state: OperatingState, label: &'static str) {
        if state != self.requested {
            debug!(from = %self.requested, to = %state, "state requested");
            if state != self.applied {
                self.motion = None;
            } else {
                // Back to the applied state after a request that may have
                // dropped its move: run its entry again.
                self.entry_pending = true;
            }
        }
        self.requested = state;
        self.request_label = label;
    }

    fn record_anomaly(&mut self) {
        self.anomaly_count += 1;
        self.pending_faults |= TickFaults::UNRECOGNIZED_STATE;
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// Run one control evaluation at `now`.
    ///
    /// Never fails; problems are reported in the returned telemetry.
    pub fn tick(&mut self, now: Instant) -> ElevatorTelemetry {
        self.tick_count += 1;
        let mut faults = std::mem::take(&mut self.pending_faults);
        // Tracking error compares this tick's reading with the reference
        // commanded on the previous tick.
        let references = Side::BOTH.map(|side| self.pair.last_reference(side));

        // Read both sensors once.
        let mut sensed = [None; 2];
        for side in Side::BOTH {
            match self.pair.current_position(side) {
                Ok(p) => sensed[side.index()] = Some(p),
                Err(e) => faults |= e.fault_flag(),
            }
        }
        let positions = match sensed {
            [Some(left), Some(right)] => [left, right],
            _ => {
                self.log_device_faults(faults);
                return self.telemetry(now, sensed, references, faults, true);
            }
        };

        // Apply a pending transition.
        if self.requested != self.applied {
            info!(from = %self.applied, to = %self.requested, "state transition");
            self.applied = self.requested;
            self.motion = None;
            self.entry_pending = true;
        }
        if self.entry_pending {
            match self.enter(positions, now) {
                Ok(()) => self.entry_pending = false,
                Err(e) => {
                    faults |= e.fault_flag();
                    self.handle_entry_failure(e, positions, now, &mut faults);
                }
            }
        }

        // Drive the active move.
        if let Some(motion) = self.motion {
            let elapsed = motion.elapsed(now).as_secs_f64();
            for side in Side::BOTH {
                let profile = &motion.profiles[side.index()];
                let reference = profile.sample(elapsed);
                let effort = self
                    .feedforward
                    .effort_with_acceleration(reference.velocity, profile.acceleration(elapsed));
                let command = ActuatorCommand::new(reference.position, effort);
                if let Err(e) = self.pair.command_closed_loop(side, command) {
                    faults |= e.fault_flag();
                }
            }
        }

        self.log_device_faults(faults);
        self.telemetry(now, sensed, references, faults, false)
    }

    /// Entry action of the applied state.
    fn enter(&mut self, positions: [f64; 2], now: Instant) -> Result<(), ElevatorError> {
        match self.applied {
            OperatingState::Idle => self.pair.command_open_loop(0.0),
            OperatingState::HoldSetpoint { target } => self.pair.command_same_setpoint(target),
            OperatingState::ProfiledMove { goal } => {
                let goal = MotionState::at_rest(goal);
                let plan = |side: Side| {
                    Profile::create(
                        self.constraints,
                        MotionState::at_rest(positions[side.index()]),
                        goal,
                    )
                };
                let profiles = [plan(Side::Left)?, plan(Side::Right)?];
                debug!(
                    goal = goal.position,
                    duration = profiles[0].total_duration(),
                    "profiled move started"
                );
                self.motion = Some(ActiveMove {
                    profiles,
                    started_at: now,
                });
                Ok(())
            }
        }
    }

    fn handle_entry_failure(
        &mut self,
        error: ElevatorError,
        positions: [f64; 2],
        now: Instant,
        faults: &mut TickFaults,
    ) {
        match error {
            ElevatorError::InvalidConstraints { .. } => {
                warn!("{error}, falling back to Idle");
                self.requested = OperatingState::Idle;
                self.request_label = ElevatorRequest::Idle.label();
                self.applied = OperatingState::Idle;
                self.motion = None;
                match self.enter(positions, now) {
                    Ok(()) => self.entry_pending = false,
                    Err(e) => *faults |= e.fault_flag(),
                }
            }
            _ => debug!(state = %self.applied, "{error}, entry retried next tick"),
        }
    }

    fn log_device_faults(&mut self, faults: TickFaults) {
        let device = faults & TickFaults::DEVICE_MASK;
        if device != self.last_device_faults {
            if device.is_empty() {
                info!("actuator links restored");
            } else {
                warn!(faults = ?device, "actuator link fault, commanding skipped");
            }
            self.last_device_faults = device;
        }
    }

    fn telemetry(
        &self,
        now: Instant,
        sensed: [Option<f64>; 2],
        references: [Option<f64>; 2],
        faults: TickFaults,
        skipped: bool,
    ) -> ElevatorTelemetry {
        let sides = Side::BOTH.map(|side| {
            let position = sensed[side.index()];
            SideTelemetry {
                position,
                tracking_error: match (references[side.index()], position) {
                    (Some(r), Some(p)) => Some(r - p),
                    _ => None,
                },
            }
        });
        ElevatorTelemetry {
            tick: self.tick_count,
            state: self.applied.label(),
            request: self.request_label,
            sides,
            profile_elapsed: self.motion.map(|m| m.elapsed(now).as_secs_f64()),
            faults,
            skipped,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// State being applied (its entry may still be pending).
    #[inline]
    pub fn state(&self) -> OperatingState {
        self.applied
    }

    /// State to apply on the next tick.
    #[inline]
    pub fn requested(&self) -> OperatingState {
        self.requested
    }

    /// Display label of the applied state.
    #[inline]
    pub fn state_label(&self) -> &'static str {
        self.applied.label()
    }

    /// True once every side's profile of the active move has completed.
    /// False when no move is active.
    pub fn is_profile_finished(&self, now: Instant) -> bool {
        self.motion.is_some_and(|m| {
            let elapsed = m.elapsed(now).as_secs_f64();
            m.profiles.iter().all(|p| p.is_finished(elapsed))
        })
    }

    /// Profile of `side` in the active move.
    pub fn active_profile(&self, side: Side) -> Option<&Profile> {
        self.motion.as_ref().map(|m| &m.profiles[side.index()])
    }

    /// Unrecognized or invalid requests coerced to Idle so far.
    #[inline]
    pub fn anomaly_count(&self) -> u64 {
        self.anomaly_count
    }

    /// Ticks evaluated so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[inline]
    pub fn pair(&self) -> &ActuatorPair<D> {
        &self.pair
    }

    #[inline]
    pub fn pair_mut(&mut self) -> &mut ActuatorPair<D> {
        &mut self.pair
    }

    #[inline]
    pub fn constraints(&self) -> KinematicConstraints {
        self.constraints
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
