//! Integration test: trapezoidal profile kinematics.
//!
//! Samples profiles at 1 ms resolution and checks the motion they describe:
//! limits respected, continuity, symmetry, arrival at the goal.

use elevator_common::motion::{KinematicConstraints, MotionState};
use elevator_control_unit::control::profile::{Profile, ProfilePhase};

const DT: f64 = 0.001;
const EPS: f64 = 1e-6;

fn plan(v: f64, a: f64, from: f64, to: f64) -> Profile {
    Profile::create(
        KinematicConstraints::new(v, a),
        MotionState::at_rest(from),
        MotionState::at_rest(to),
    )
    .unwrap()
}

/// Samples from t = 0 to just past the end.
fn trace(profile: &Profile) -> Vec<(f64, MotionState)> {
    let steps = (profile.total_duration() / DT).ceil() as usize + 10;
    (0..=steps)
        .map(|i| {
            let t = i as f64 * DT;
            (t, profile.sample(t))
        })
        .collect()
}

fn cases() -> Vec<Profile> {
    vec![
        plan(50.0, 100.0, 0.0, 45.0),
        plan(50.0, 100.0, 45.0, 0.0),
        plan(50.0, 100.0, 10.0, 12.0),
        plan(3000.0 / 60.0, 6000.0 / 60.0, 0.0, 1000.0),
        plan(1.0, 2.0, 0.0, -1.0),
        plan(1.0, 1.0, 0.0, 1.0),
    ]
}

#[test]
fn velocity_never_exceeds_limit() {
    for profile in cases() {
        let v_max = profile.constraints().max_velocity;
        for (t, s) in trace(&profile) {
            assert!(
                s.velocity.abs() <= v_max + EPS,
                "|v|={} > {v_max} at t={t}",
                s.velocity
            );
        }
    }
}

#[test]
fn acceleration_never_exceeds_limit() {
    for profile in cases() {
        let a_max = profile.constraints().max_acceleration;
        let samples = trace(&profile);
        for pair in samples.windows(2) {
            let (t0, s0) = pair[0];
            let (t1, s1) = pair[1];
            let accel = (s1.velocity - s0.velocity) / (t1 - t0);
            assert!(
                accel.abs() <= a_max * (1.0 + 1e-6) + EPS,
                "|a|={accel} > {a_max} between t={t0} and t={t1}"
            );
        }
    }
}

#[test]
fn position_is_continuous_and_monotonic() {
    for profile in cases() {
        let dir = (profile.goal().position - profile.start().position).signum();
        let step_bound = profile.peak_velocity() * DT + EPS;
        for pair in trace(&profile).windows(2) {
            let dp = pair[1].1.position - pair[0].1.position;
            assert!(dp.abs() <= step_bound, "position jump {dp} at t={}", pair[0].0);
            assert!(dp * dir >= -EPS, "moved backwards at t={}", pair[0].0);
        }
    }
}

#[test]
fn starts_at_start_and_ends_at_goal() {
    for profile in cases() {
        assert_eq!(profile.sample(0.0), profile.start());
        let end = profile.sample(profile.total_duration());
        assert_eq!(end, profile.goal());
        assert_eq!(end.velocity, 0.0);
        assert_eq!(profile.sample(profile.total_duration() + 5.0), profile.goal());
    }
}

#[test]
fn decel_phase_mirrors_accel_phase() {
    for profile in cases() {
        let samples = trace(&profile);
        let accel = samples
            .iter()
            .filter(|(t, _)| profile.phase(*t) == ProfilePhase::Accelerate)
            .count() as i64;
        let decel = samples
            .iter()
            .filter(|(t, _)| profile.phase(*t) == ProfilePhase::Decelerate)
            .count() as i64;
        assert!((accel - decel).abs() <= 1, "accel {accel} vs decel {decel} samples");

        // Velocity is symmetric about the midpoint of the move.
        let total = profile.total_duration();
        for k in 1..20 {
            let t = total * f64::from(k) / 40.0;
            let early = profile.sample(t).velocity;
            let late = profile.sample(total - t).velocity;
            assert!((early - late).abs() < 1e-6, "asymmetric at t={t}");
        }
    }
}

#[test]
fn long_move_reaches_cruise_short_move_does_not() {
    let long = plan(50.0, 100.0, 0.0, 45.0);
    assert!(!long.is_triangular());
    assert!((long.total_duration() - 1.4).abs() < 1e-9);
    assert!(
        trace(&long)
            .iter()
            .any(|(t, _)| long.phase(*t) == ProfilePhase::Cruise)
    );

    let short = plan(50.0, 100.0, 10.0, 12.0);
    assert!(short.is_triangular());
    assert!(
        trace(&short)
            .iter()
            .all(|(t, _)| short.phase(*t) != ProfilePhase::Cruise)
    );
    assert!((short.peak_velocity() - (2.0f64 * 100.0).sqrt()).abs() < 1e-9);
}

#[test]
fn sampled_acceleration_matches_phase() {
    let profile = plan(50.0, 100.0, 45.0, 0.0);
    assert_eq!(profile.acceleration(0.1), -100.0);
    assert_eq!(profile.acceleration(0.6), 0.0);
    assert_eq!(profile.acceleration(1.3), 100.0);
    assert_eq!(profile.acceleration(2.0), 0.0);
}
