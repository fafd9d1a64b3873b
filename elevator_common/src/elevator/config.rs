//! Configuration structures for the elevator.
//!
//! All tables use `serde::Deserialize` for TOML loading. Every field except
//! `shared.service_name` has a default, so a minimal file only names the
//! service. Bounds are checked by [`ElevatorConfig::validate`].
//!
//! ```toml
//! [shared]
//! service_name = "elevator-01"
//!
//! [constraints]
//! max_velocity = 50.0
//! max_acceleration = 100.0
//!
//! [actuators]
//! inverted_side = "right"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, ConfigLoader, SharedConfig};
use crate::consts::{
    ACTUATOR_KD_DEFAULT, ACTUATOR_KP_DEFAULT, ACTUATOR_PEAK_OUTPUT_DEFAULT, CYCLE_PERIOD_MS,
    CYCLE_PERIOD_MS_MAX, CYCLE_PERIOD_MS_MIN, FF_KG_DEFAULT, FF_KS_DEFAULT, FF_KV_DEFAULT,
};
use crate::motion::KinematicConstraints;

use super::state::{NamedSetpoint, Polarity, Side};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete elevator configuration, immutable after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevatorConfig {
    /// Logging and instance identity.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Control loop timing.
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Trapezoidal profile limits shared by both sides.
    #[serde(default)]
    pub constraints: KinematicConstraints,

    /// Feedforward calibration.
    #[serde(default)]
    pub feedforward: FeedforwardGains,

    /// Named setpoint positions.
    #[serde(default)]
    pub setpoints: SetpointTable,

    /// Actuator polarity and on-board closed-loop gains.
    #[serde(default)]
    pub actuators: ActuatorConfig,

    /// Telemetry publishing.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            cycle: CycleConfig::default(),
            constraints: KinematicConstraints::default(),
            feedforward: FeedforwardGains::default(),
            setpoints: SetpointTable::default(),
            actuators: ActuatorConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl ElevatorConfig {
    /// Load from a TOML file and validate.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        debug!(path = %path.display(), "elevator config loaded");
        Ok(config)
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config = Self::load_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.cycle.validate()?;
        self.constraints
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.feedforward.validate()?;
        self.setpoints.validate()?;
        self.actuators.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

// ─── Cycle ──────────────────────────────────────────────────────────

/// Control loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Tick period [ms] (default: 20).
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

fn default_period_ms() -> u64 {
    CYCLE_PERIOD_MS
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            period_ms: CYCLE_PERIOD_MS,
        }
    }
}

impl CycleConfig {
    /// Tick period as a `Duration`.
    #[inline]
    pub const fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(CYCLE_PERIOD_MS_MIN..=CYCLE_PERIOD_MS_MAX).contains(&self.period_ms) {
            return Err(ConfigError::ValidationError(format!(
                "cycle.period_ms {} out of range [{CYCLE_PERIOD_MS_MIN}, {CYCLE_PERIOD_MS_MAX}]",
                self.period_ms
            )));
        }
        Ok(())
    }
}

// ─── Feedforward ────────────────────────────────────────────────────

/// Elevator feedforward gains.
///
/// `effort = ks × sign(v) + kg + kv × v + ka × a`. Zero gains disable a term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedforwardGains {
    /// Static friction term.
    #[serde(default = "default_ks")]
    pub ks: f64,
    /// Gravity term.
    #[serde(default = "default_kg")]
    pub kg: f64,
    /// Velocity gain.
    #[serde(default = "default_kv")]
    pub kv: f64,
    /// Acceleration gain (0 = disabled).
    #[serde(default)]
    pub ka: f64,
}

fn default_ks() -> f64 {
    FF_KS_DEFAULT
}
fn default_kg() -> f64 {
    FF_KG_DEFAULT
}
fn default_kv() -> f64 {
    FF_KV_DEFAULT
}

impl Default for FeedforwardGains {
    fn default() -> Self {
        Self {
            ks: FF_KS_DEFAULT,
            kg: FF_KG_DEFAULT,
            kv: FF_KV_DEFAULT,
            ka: 0.0,
        }
    }
}

impl FeedforwardGains {
    /// All gains zero: feedforward disabled.
    pub const ZERO: Self = Self {
        ks: 0.0,
        kg: 0.0,
        kv: 0.0,
        ka: 0.0,
    };

    fn validate(&self) -> Result<(), ConfigError> {
        let all = [("ks", self.ks), ("kg", self.kg), ("kv", self.kv), ("ka", self.ka)];
        if let Some((name, _)) = all.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "feedforward.{name} must be finite"
            )));
        }
        if self.ks < 0.0 {
            return Err(ConfigError::ValidationError(
                "feedforward.ks must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Setpoints ──────────────────────────────────────────────────────

/// Positions of the named setpoints [units].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetpointTable {
    /// Top node extension.
    #[serde(default = "default_top")]
    pub top: f64,
    /// Middle node, cube.
    #[serde(default = "default_mid_cube")]
    pub mid_cube: f64,
    /// Middle node, cone.
    #[serde(default = "default_mid_cone")]
    pub mid_cone: f64,
    /// Fully retracted; target of `request_retract`.
    #[serde(default)]
    pub bottom: f64,
}

fn default_top() -> f64 {
    45.0
}
fn default_mid_cube() -> f64 {
    28.0
}
fn default_mid_cone() -> f64 {
    34.0
}

impl Default for SetpointTable {
    fn default() -> Self {
        Self {
            top: default_top(),
            mid_cube: default_mid_cube(),
            mid_cone: default_mid_cone(),
            bottom: 0.0,
        }
    }
}

impl SetpointTable {
    /// Position of a named setpoint.
    #[inline]
    pub const fn resolve(&self, name: NamedSetpoint) -> f64 {
        match name {
            NamedSetpoint::Top => self.top,
            NamedSetpoint::MidCube => self.mid_cube,
            NamedSetpoint::MidCone => self.mid_cone,
            NamedSetpoint::Bottom => self.bottom,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("top", self.top),
            ("mid_cube", self.mid_cube),
            ("mid_cone", self.mid_cone),
            ("bottom", self.bottom),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "setpoints.{name} must be finite"
                )));
            }
        }
        Ok(())
    }
}

// ─── Actuators ──────────────────────────────────────────────────────

/// Actuator pair configuration.
///
/// The closed-loop gains are handed to the motor controllers; the control
/// core never evaluates them itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// The side whose command polarity is inverted (default: right).
    #[serde(default = "default_inverted_side")]
    pub inverted_side: Side,
    /// On-board proportional gain.
    #[serde(default = "default_kp")]
    pub kp: f64,
    /// On-board derivative gain.
    #[serde(default = "default_kd")]
    pub kd: f64,
    /// Closed-loop peak output, fraction of full effort in (0, 1].
    #[serde(default = "default_peak_output")]
    pub peak_output: f64,
}

fn default_inverted_side() -> Side {
    Side::Right
}
fn default_kp() -> f64 {
    ACTUATOR_KP_DEFAULT
}
fn default_kd() -> f64 {
    ACTUATOR_KD_DEFAULT
}
fn default_peak_output() -> f64 {
    ACTUATOR_PEAK_OUTPUT_DEFAULT
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            inverted_side: Side::Right,
            kp: ACTUATOR_KP_DEFAULT,
            kd: ACTUATOR_KD_DEFAULT,
            peak_output: ACTUATOR_PEAK_OUTPUT_DEFAULT,
        }
    }
}

impl ActuatorConfig {
    /// Per-side polarity, indexed by [`Side::index`].
    pub const fn polarity(&self) -> [Polarity; 2] {
        match self.inverted_side {
            Side::Left => [Polarity::Inverted, Polarity::Normal],
            Side::Right => [Polarity::Normal, Polarity::Inverted],
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.kp.is_finite() && self.kp >= 0.0) || !(self.kd.is_finite() && self.kd >= 0.0) {
            return Err(ConfigError::ValidationError(
                "actuators.kp and actuators.kd must be finite and >= 0".to_string(),
            ));
        }
        if !(self.peak_output > 0.0 && self.peak_output <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "actuators.peak_output {} out of range (0, 1]",
                self.peak_output
            )));
        }
        Ok(())
    }
}

// ─── Telemetry ──────────────────────────────────────────────────────

/// Telemetry publishing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Emit a log record every N ticks (default: 1 = every tick).
    #[serde(default = "default_publish_interval")]
    pub publish_interval: u32,
}

fn default_publish_interval() -> u32 {
    1
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            publish_interval: 1,
        }
    }
}

impl TelemetryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.publish_interval == 0 {
            return Err(ConfigError::ValidationError(
                "telemetry.publish_interval must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
