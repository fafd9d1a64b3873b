//! Integration test: operating-state transitions through the actuator pair.
//!
//! Checks which device-frame writes each entry action produces and that
//! every distinct transition fires its entry exactly once.

use std::time::{Duration, Instant};

use elevator_common::elevator::config::ElevatorConfig;
use elevator_common::elevator::error::TickFaults;
use elevator_common::elevator::state::{ElevatorRequest, NamedSetpoint, OperatingState, Side};
use elevator_control_unit::actuator::ActuatorPair;
use elevator_control_unit::state::ElevatorController;

use super::{RecordingDevice, Write};

const TICK: Duration = Duration::from_millis(20);

fn controller(height: f64) -> ElevatorController<RecordingDevice> {
    let config = ElevatorConfig::default();
    let pair = ActuatorPair::from_config(RecordingDevice::at_height(height), &config.actuators);
    ElevatorController::new(pair, &config)
}

fn writes(c: &mut ElevatorController<RecordingDevice>) -> Vec<Write> {
    c.pair_mut().device_mut().take_writes()
}

#[test]
fn startup_idles_once() {
    let mut c = controller(0.0);
    let t0 = Instant::now();
    c.tick(t0);
    assert_eq!(
        writes(&mut c),
        vec![Write::Open(Side::Left, 0.0), Write::Open(Side::Right, -0.0)]
    );
    for k in 1..10 {
        c.tick(t0 + TICK * k);
    }
    assert!(writes(&mut c).is_empty());
}

#[test]
fn named_setpoint_holds_both_sides() {
    let mut c = controller(0.0);
    let t0 = Instant::now();
    c.tick(t0);
    writes(&mut c);

    c.request_setpoint(NamedSetpoint::Top);
    c.tick(t0 + TICK);
    assert_eq!(c.state(), OperatingState::HoldSetpoint { target: 45.0 });
    assert_eq!(
        writes(&mut c),
        vec![
            Write::Closed(Side::Left, 45.0, 0.0),
            Write::Closed(Side::Right, -45.0, -0.0)
        ]
    );

    // Re-requesting the same state is not a transition.
    c.request_setpoint(NamedSetpoint::Top);
    c.tick(t0 + TICK * 2);
    assert!(writes(&mut c).is_empty());
}

#[test]
fn switching_setpoints_fires_each_entry() {
    let mut c = controller(0.0);
    let t0 = Instant::now();
    let sequence = [
        (NamedSetpoint::MidCube, 28.0),
        (NamedSetpoint::MidCone, 34.0),
        (NamedSetpoint::Top, 45.0),
    ];
    c.tick(t0);
    writes(&mut c);
    for (k, (name, target)) in sequence.into_iter().enumerate() {
        c.request_setpoint(name);
        c.tick(t0 + TICK * (k as u32 + 1));
        let w = writes(&mut c);
        assert_eq!(w.len(), 2, "{name:?}");
        assert_eq!(w[0], Write::Closed(Side::Left, target, 0.0));
    }
}

#[test]
fn latest_request_between_ticks_wins() {
    let mut c = controller(0.0);
    let t0 = Instant::now();
    c.tick(t0);
    writes(&mut c);

    c.request_setpoint(NamedSetpoint::Top);
    c.request_setpoint(12.5);
    c.tick(t0 + TICK);
    assert_eq!(c.state(), OperatingState::HoldSetpoint { target: 12.5 });
    assert_eq!(writes(&mut c)[0], Write::Closed(Side::Left, 12.5, 0.0));
}

#[test]
fn retract_streams_references_until_idle() {
    let mut c = controller(45.0);
    let t0 = Instant::now();
    c.tick(t0);
    writes(&mut c);

    c.request_retract();
    let start = t0 + TICK;
    c.tick(start);
    assert_eq!(c.state(), OperatingState::ProfiledMove { goal: 0.0 });
    let profile = *c.active_profile(Side::Left).unwrap();
    assert!((profile.total_duration() - 1.4).abs() < 1e-9);

    // One closed-loop write per side per tick, references descending.
    let mut last_ref = f64::INFINITY;
    for k in 0..90 {
        if k > 0 {
            c.tick(start + TICK * k);
        }
        let w = writes(&mut c);
        assert_eq!(w.len(), 2);
        match (w[0], w[1]) {
            (Write::Closed(Side::Left, l, _), Write::Closed(Side::Right, r, _)) => {
                assert_eq!(l, -r);
                assert!(l <= last_ref);
                last_ref = l;
            }
            other => panic!("unexpected writes {other:?}"),
        }
    }
    assert_eq!(last_ref, 0.0);
    assert!(c.is_profile_finished(start + TICK * 89));
    assert_eq!(c.state(), OperatingState::ProfiledMove { goal: 0.0 });

    c.request_idle();
    c.tick(start + TICK * 90);
    assert_eq!(
        writes(&mut c),
        vec![Write::Open(Side::Left, 0.0), Write::Open(Side::Right, -0.0)]
    );
    assert!(c.active_profile(Side::Left).is_none());
}

#[test]
fn feedforward_rides_with_profile() {
    let mut c = controller(0.0);
    let t0 = Instant::now();
    c.tick(t0);
    c.request(ElevatorRequest::Retract);
    // Start below the bottom setpoint so the move goes up.
    c.pair_mut().device_mut().positions = [-10.0, 10.0];
    writes(&mut c);

    c.tick(t0 + TICK);
    c.tick(t0 + TICK * 2);
    let w = writes(&mut c);
    // Second tick of the move: accelerating upward, 20 ms in.
    match w[2] {
        Write::Closed(Side::Left, reference, ff) => {
            assert!((reference - (-10.0 + 0.5 * 100.0 * 0.02 * 0.02)).abs() < 1e-9);
            let expected = 0.1 - 0.16 + (1.0 / 5880.0) * 2.0;
            assert!((ff - expected).abs() < 1e-9, "ff={ff}");
        }
        other => panic!("unexpected write {other:?}"),
    }
}

#[test]
fn unknown_codes_are_counted_and_idle() {
    let mut c = controller(0.0);
    let t0 = Instant::now();
    c.request_code(1);
    c.tick(t0);
    writes(&mut c);

    c.request_code(9);
    let t = c.tick(t0 + TICK);
    assert!(t.faults.contains(TickFaults::UNRECOGNIZED_STATE));
    assert_eq!(c.state(), OperatingState::Idle);
    assert_eq!(c.anomaly_count(), 1);
    assert_eq!(writes(&mut c)[0], Write::Open(Side::Left, 0.0));

    // Reported once, not on every following tick.
    let t = c.tick(t0 + TICK * 2);
    assert!(t.faults.is_empty());
}
