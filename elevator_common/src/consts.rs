//! System-wide constants for the elevator workspace.
//!
//! Single source of truth for cycle timing bounds and the factory calibration
//! of the two-motor elevator. Imported by all crates.

/// Default control period in milliseconds (50 Hz).
pub const CYCLE_PERIOD_MS: u64 = 20;

/// Shortest accepted control period [ms].
pub const CYCLE_PERIOD_MS_MIN: u64 = 1;

/// Longest accepted control period [ms].
pub const CYCLE_PERIOD_MS_MAX: u64 = 1000;

/// Default maximum carriage velocity [rot/s] (3000 rpm).
pub const MAX_VELOCITY_DEFAULT: f64 = 3000.0 / 60.0;

/// Default maximum carriage acceleration [rot/s²].
pub const MAX_ACCELERATION_DEFAULT: f64 = 6000.0 / 60.0;

/// Default static friction feedforward term.
pub const FF_KS_DEFAULT: f64 = 0.1;

/// Default gravity feedforward term.
pub const FF_KG_DEFAULT: f64 = -0.16;

/// Default velocity feedforward gain (free speed 5880 rpm).
pub const FF_KV_DEFAULT: f64 = 1.0 / 5880.0;

/// Default on-board proportional gain of each motor controller.
pub const ACTUATOR_KP_DEFAULT: f64 = 0.4;

/// Default on-board derivative gain of each motor controller.
pub const ACTUATOR_KD_DEFAULT: f64 = 0.02;

/// Default peak closed-loop output (fraction of full effort).
pub const ACTUATOR_PEAK_OUTPUT_DEFAULT: f64 = 0.8;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/elevator/elevator.toml";
