//! Integration test: closed loop against the simulated elevator.
//!
//! Controller ticks and simulation steps are interleaved on a synthetic
//! clock, so these runs are deterministic.

use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use elevator_common::elevator::config::ElevatorConfig;
use elevator_common::elevator::state::{NamedSetpoint, Side};
use elevator_common::elevator::telemetry::ElevatorTelemetry;
use elevator_common::hal::DriverContext;
use elevator_control_unit::actuator::ActuatorPair;
use elevator_control_unit::cycle::CycleRunner;
use elevator_control_unit::state::ElevatorController;
use elevator_control_unit::telemetry::RecordingSink;
use elevator_hal::{DriverRegistry, SimulatedElevator, SimulationParams};

const TICK: Duration = Duration::from_millis(20);

struct Rig {
    controller: ElevatorController<SimulatedElevator>,
    now: Instant,
}

impl Rig {
    fn at_height(height: f64) -> Self {
        let config = ElevatorConfig::default();
        let mut sim = SimulatedElevator::new(&config.actuators, SimulationParams::default());
        sim.set_height(height);
        let pair = ActuatorPair::from_config(sim, &config.actuators);
        Self {
            controller: ElevatorController::new(pair, &config),
            now: Instant::now(),
        }
    }

    /// Tick, then let the plant run for one period.
    fn run_for(&mut self, duration: Duration) -> Vec<ElevatorTelemetry> {
        let ticks = duration.as_millis() / TICK.as_millis();
        (0..ticks)
            .map(|_| {
                let t = self.controller.tick(self.now);
                self.controller.pair_mut().device_mut().step(TICK);
                self.now += TICK;
                t
            })
            .collect()
    }

    fn sim(&self) -> &SimulatedElevator {
        self.controller.pair().device()
    }

    fn assert_height(&self, expected: f64, tolerance: f64) {
        for side in Side::BOTH {
            let h = self.sim().height(side);
            assert!(
                (h - expected).abs() < tolerance,
                "{side} at {h}, expected {expected}"
            );
        }
    }
}

#[test]
fn retract_lands_at_bottom() {
    let mut rig = Rig::at_height(40.0);
    rig.run_for(TICK * 2);
    rig.controller.request_retract();

    let log = rig.run_for(Duration::from_millis(2600));
    rig.assert_height(0.0, 0.25);
    assert!(rig.controller.is_profile_finished(rig.now));
    assert!(log.iter().all(|t| t.faults.is_empty() && !t.skipped));

    // Both sides track the reference closely and identically.
    for t in &log {
        let l = t.side(Side::Left);
        let r = t.side(Side::Right);
        if let (Some(el), Some(er)) = (l.tracking_error, r.tracking_error) {
            assert!(el.abs() < 8.0, "tick {} error {el}", t.tick);
            assert!((el - er).abs() < 1e-6);
        }
    }
}

#[test]
fn hold_reaches_named_setpoint() {
    let mut rig = Rig::at_height(0.0);
    rig.controller.request_setpoint(NamedSetpoint::Top);
    rig.run_for(Duration::from_secs(2));
    // No feedforward while holding, so the load leaves a small offset.
    rig.assert_height(45.0, 1.0);
    assert!((rig.sim().height(Side::Left) - rig.sim().height(Side::Right)).abs() < 1e-9);
}

#[test]
fn idle_stops_and_holds_on_brake() {
    let mut rig = Rig::at_height(0.0);
    rig.controller.request_setpoint(NamedSetpoint::MidCube);
    rig.run_for(Duration::from_secs(2));

    rig.controller.request_idle();
    rig.run_for(TICK * 5);
    let parked = rig.sim().height(Side::Left);
    rig.run_for(Duration::from_secs(1));
    rig.assert_height(parked, 0.05);
    assert!(rig.sim().velocity(Side::Left).abs() < 1e-6);
}

#[test]
fn move_interrupted_by_new_setpoint() {
    let mut rig = Rig::at_height(45.0);
    rig.controller.request_retract();
    rig.run_for(Duration::from_millis(400));
    assert!(!rig.controller.is_profile_finished(rig.now));

    rig.controller.request_setpoint(NamedSetpoint::MidCone);
    rig.run_for(Duration::from_secs(2));
    assert!(rig.controller.active_profile(Side::Left).is_none());
    rig.assert_height(34.0, 1.0);
}

#[test]
fn registry_backend_runs_under_cycle_runner() {
    let config = ElevatorConfig::default();
    let device = DriverRegistry::with_builtin_drivers()
        .create_driver("simulation", &DriverContext::default())
        .unwrap();
    let controller = ElevatorController::new(
        ActuatorPair::from_config(device, &config.actuators),
        &config,
    );

    let mut runner = CycleRunner::new(controller, RecordingSink::new(), Duration::from_millis(2))
        .with_max_ticks(10);
    runner.controller_mut().request_setpoint(NamedSetpoint::MidCube);
    let stats = runner.run(&AtomicBool::new(true)).clone();

    assert_eq!(stats.cycle_count, 10);
    assert_eq!(stats.skipped_ticks, 0);
    let records = runner.sink().records();
    assert_eq!(records.len(), 10);
    assert_eq!(records[0].state, "Hold Setpoint");
    assert!(records.iter().all(|t| t.faults.is_empty()));
}
