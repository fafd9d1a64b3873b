//! Prelude module for common re-exports.
//!
//! ```rust
//! use elevator_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::elevator::config::{
    ActuatorConfig, CycleConfig, ElevatorConfig, FeedforwardGains, SetpointTable,
    TelemetryConfig,
};

// ─── Motion ─────────────────────────────────────────────────────────
pub use crate::motion::{KinematicConstraints, MotionState};

// ─── Elevator State & Errors ────────────────────────────────────────
pub use crate::elevator::error::{ElevatorError, TickFaults};
pub use crate::elevator::state::{
    ElevatorRequest, NamedSetpoint, OperatingState, Polarity, SetpointRequest, Side,
};
pub use crate::elevator::telemetry::{ElevatorTelemetry, SideTelemetry};

// ─── Devices ────────────────────────────────────────────────────────
pub use crate::hal::{ActuatorDevice, DriverContext, HalError};

/// Default control period as a `Duration`.
pub const DEFAULT_CYCLE_PERIOD: Duration =
    Duration::from_millis(crate::consts::CYCLE_PERIOD_MS);
