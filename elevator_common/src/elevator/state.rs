//! Operating states and inbound requests of the elevator.
//!
//! Labels are derived from the variants for display and logging; no text is
//! stored in the data model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ElevatorError;

// ─── Actuator Sides ─────────────────────────────────────────────────

/// One of the two physically-coupled actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    /// Left extension motor.
    Left = 0,
    /// Right extension motor.
    Right = 1,
}

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Array index for per-side storage.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Command polarity of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Logical and device frames agree.
    #[default]
    Normal,
    /// Device frame is the negated logical frame.
    Inverted,
}

impl Polarity {
    /// Multiplier mapping logical values into the device frame (and back).
    #[inline]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Inverted => -1.0,
        }
    }
}

// ─── Setpoints ──────────────────────────────────────────────────────

/// Named heights of the scoring mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedSetpoint {
    /// Top node extension.
    Top,
    /// Middle node, cube.
    MidCube,
    /// Middle node, cone.
    MidCone,
    /// Fully retracted.
    Bottom,
}

impl NamedSetpoint {
    /// Parse a dispatch-layer name (`top`, `mid-cube`, `mid_cone`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "top" => Some(Self::Top),
            "mid_cube" => Some(Self::MidCube),
            "mid_cone" => Some(Self::MidCone),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Top => "Top Node Extension",
            Self::MidCube => "Mid Cube",
            Self::MidCone => "Mid Cone",
            Self::Bottom => "Bottom",
        }
    }
}

/// Argument of `request_setpoint`: a configured name or a raw position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetpointRequest {
    /// Resolve through the configured setpoint table.
    Named(NamedSetpoint),
    /// Absolute position [units].
    Position(f64),
}

impl From<NamedSetpoint> for SetpointRequest {
    fn from(name: NamedSetpoint) -> Self {
        Self::Named(name)
    }
}

impl From<f64> for SetpointRequest {
    fn from(position: f64) -> Self {
        Self::Position(position)
    }
}

// ─── Requests ───────────────────────────────────────────────────────

/// Inbound request from the command-dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElevatorRequest {
    /// Stop driving: open-loop zero.
    Idle,
    /// Hold a static setpoint under closed-loop control.
    Setpoint(SetpointRequest),
    /// Profiled move to the bottom setpoint.
    Retract,
}

impl ElevatorRequest {
    /// Decode a numeric request code.
    ///
    /// | Code | Request |
    /// |------|---------|
    /// | 0 | Idle |
    /// | 1 | Top |
    /// | 2 | Mid cube |
    /// | 3 | Mid cone |
    /// | 4 | Retract |
    pub const fn from_code(code: u8) -> Result<Self, ElevatorError> {
        match code {
            0 => Ok(Self::Idle),
            1 => Ok(Self::Setpoint(SetpointRequest::Named(NamedSetpoint::Top))),
            2 => Ok(Self::Setpoint(SetpointRequest::Named(NamedSetpoint::MidCube))),
            3 => Ok(Self::Setpoint(SetpointRequest::Named(NamedSetpoint::MidCone))),
            4 => Ok(Self::Retract),
            _ => Err(ElevatorError::UnrecognizedState { code }),
        }
    }

    /// Parse a CLI/dispatch token: `idle`, `retract`, a setpoint name, or a number.
    pub fn parse(token: &str) -> Option<Self> {
        let t = token.trim().to_ascii_lowercase();
        match t.as_str() {
            "idle" => Some(Self::Idle),
            "retract" => Some(Self::Retract),
            _ => NamedSetpoint::from_name(&t)
                .map(SetpointRequest::Named)
                .or_else(|| t.parse::<f64>().ok().filter(|v| v.is_finite()).map(SetpointRequest::Position))
                .map(Self::Setpoint),
        }
    }

    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Setpoint(SetpointRequest::Named(name)) => name.label(),
            Self::Setpoint(SetpointRequest::Position(_)) => "Setpoint",
            Self::Retract => "Retracted",
        }
    }
}

// ─── Operating State ────────────────────────────────────────────────

/// The single active operating state of the elevator.
///
/// Replaced, never mutated in place, on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OperatingState {
    /// Open-loop zero effort.
    #[default]
    Idle,
    /// Both sides closed-loop to the same static target.
    HoldSetpoint {
        /// Target position [units].
        target: f64,
    },
    /// Trapezoidal move to `goal`, sampled every tick.
    ProfiledMove {
        /// Goal position [units].
        goal: f64,
    },
}

impl OperatingState {
    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::HoldSetpoint { .. } => "Hold Setpoint",
            Self::ProfiledMove { .. } => "Profiled Move",
        }
    }

    /// Position this state drives toward, if any.
    pub const fn target(&self) -> Option<f64> {
        match self {
            Self::Idle => None,
            Self::HoldSetpoint { target } => Some(*target),
            Self::ProfiledMove { goal } => Some(*goal),
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(t) => write!(f, "{}({t})", self.label()),
            None => f.write_str(self.label()),
        }
    }
}
