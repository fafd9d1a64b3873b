//! Integration test: actuator link faults.
//!
//! A tick whose sensor reads fail must not command anything or change
//! state; the move clock keeps running on wall time so a profiled move picks
//! up where it should once the link comes back.

use std::time::{Duration, Instant};

use elevator_common::elevator::config::{ActuatorConfig, ElevatorConfig};
use elevator_common::elevator::error::TickFaults;
use elevator_common::elevator::state::{NamedSetpoint, OperatingState, Side};
use elevator_control_unit::actuator::ActuatorPair;
use elevator_control_unit::state::ElevatorController;
use elevator_hal::drivers::simulation::MotorCommand;
use elevator_hal::{SimulatedElevator, SimulationParams};

use super::{RecordingDevice, Write};

const TICK: Duration = Duration::from_millis(20);

fn simulated(height: f64) -> ElevatorController<SimulatedElevator> {
    let config = ElevatorConfig::default();
    let mut sim = SimulatedElevator::new(&ActuatorConfig::default(), SimulationParams::default());
    sim.set_height(height);
    ElevatorController::new(ActuatorPair::from_config(sim, &config.actuators), &config)
}

#[test]
fn failed_read_skips_tick_and_reports_side() {
    let mut c = simulated(0.0);
    let t0 = Instant::now();
    c.tick(t0);

    c.request_setpoint(NamedSetpoint::MidCube);
    c.pair_mut().device_mut().fail_next_reads(Side::Right, 1);
    let t = c.tick(t0 + TICK);
    assert!(t.skipped);
    assert_eq!(t.faults, TickFaults::RIGHT_UNAVAILABLE);
    assert!(t.side(Side::Left).position.is_some());
    assert!(t.side(Side::Right).position.is_none());
    // Requested but not yet applied.
    assert_eq!(c.state(), OperatingState::Idle);
    assert_eq!(
        c.pair().device().last_command(Side::Left),
        MotorCommand::OpenLoop(0.0)
    );

    let t = c.tick(t0 + TICK * 2);
    assert!(!t.skipped);
    assert!(t.faults.is_empty());
    assert_eq!(c.state(), OperatingState::HoldSetpoint { target: 28.0 });
    assert_eq!(
        c.pair().device().last_command(Side::Left),
        MotorCommand::ClosedLoop {
            reference: 28.0,
            feedforward: 0.0
        }
    );
}

#[test]
fn both_links_down_reports_both() {
    let mut c = simulated(0.0);
    let t0 = Instant::now();
    for side in Side::BOTH {
        c.pair_mut().device_mut().set_link_available(side, false);
    }
    let t = c.tick(t0);
    assert!(t.skipped);
    assert_eq!(t.faults, TickFaults::DEVICE_MASK);
    assert_eq!(t.tick, 1);
}

#[test]
fn entry_retried_until_write_succeeds() {
    let config = ElevatorConfig::default();
    let pair = ActuatorPair::from_config(RecordingDevice::at_height(0.0), &config.actuators);
    let mut c = ElevatorController::new(pair, &config);
    let t0 = Instant::now();
    c.tick(t0);
    c.pair_mut().device_mut().take_writes();

    // Reads succeed, so the tick runs, but the right side rejects writes.
    c.request_setpoint(NamedSetpoint::Top);
    c.pair_mut().device_mut().reject_writes[Side::Right.index()] = true;
    let t = c.tick(t0 + TICK);
    assert!(!t.skipped);
    assert_eq!(t.faults, TickFaults::RIGHT_UNAVAILABLE);
    assert_eq!(c.state(), OperatingState::HoldSetpoint { target: 45.0 });
    assert_eq!(
        c.pair_mut().device_mut().take_writes(),
        vec![Write::Closed(Side::Left, 45.0, 0.0)]
    );

    // Link healthy again: the whole entry runs once more, then never again.
    c.pair_mut().device_mut().reject_writes[Side::Right.index()] = false;
    let t = c.tick(t0 + TICK * 2);
    assert!(t.faults.is_empty());
    assert_eq!(
        c.pair_mut().device_mut().take_writes(),
        vec![
            Write::Closed(Side::Left, 45.0, 0.0),
            Write::Closed(Side::Right, -45.0, -0.0)
        ]
    );
    c.tick(t0 + TICK * 3);
    assert!(c.pair_mut().device_mut().take_writes().is_empty());
}

#[test]
fn profiled_move_resumes_on_schedule_after_outage() {
    let mut c = simulated(45.0);
    let t0 = Instant::now();
    c.tick(t0);
    c.request_retract();
    let start = t0 + TICK;
    c.tick(start);

    // Outage from 0.2 s to 0.6 s into the move.
    let mut before_outage = None;
    for k in 1..=30u32 {
        let down = (10..30).contains(&k);
        c.pair_mut().device_mut().set_link_available(Side::Left, !down);
        let t = c.tick(start + TICK * k);
        assert_eq!(t.skipped, down, "tick {k}");
        if k == 9 {
            before_outage = c.pair().last_reference(Side::Left);
        }
        if down {
            assert_eq!(c.pair().last_reference(Side::Left), before_outage);
            assert!(t.profile_elapsed.is_some());
        }
    }

    // First tick after the outage samples 0.6 s, not 0.2 s.
    let expected = c.active_profile(Side::Left).unwrap().sample(0.6).position;
    assert!((c.pair().last_reference(Side::Left).unwrap() - expected).abs() < 1e-9);
    assert_eq!(c.state(), OperatingState::ProfiledMove { goal: 0.0 });
}
