//! Per-tick telemetry payload.
//!
//! Produced once per control tick for the dashboard/logging layer. Format and
//! transport belong to the consumer.

use serde::Serialize;

use super::error::TickFaults;
use super::state::Side;

/// Sensed position and tracking error of one side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SideTelemetry {
    /// Latest sensed position [units], `None` if the read failed.
    pub position: Option<f64>,
    /// Closed-loop tracking error (reference − sensed), `None` when not
    /// under closed-loop control or the position is unknown.
    pub tracking_error: Option<f64>,
}

/// Snapshot published after every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevatorTelemetry {
    /// Monotonic tick counter, starting at 1.
    pub tick: u64,
    /// Label of the applied operating state.
    pub state: &'static str,
    /// Label of the most recent request.
    pub request: &'static str,
    /// Per-side data indexed by [`Side::index`].
    pub sides: [SideTelemetry; 2],
    /// Seconds since the active profiled move started.
    pub profile_elapsed: Option<f64>,
    /// Faults observed this tick.
    #[serde(serialize_with = "serialize_faults")]
    pub faults: TickFaults,
    /// True if commanding was skipped this tick.
    pub skipped: bool,
}

impl ElevatorTelemetry {
    /// Data of one side.
    #[inline]
    pub const fn side(&self, side: Side) -> &SideTelemetry {
        &self.sides[side.index()]
    }
}

fn serialize_faults<S: serde::Serializer>(faults: &TickFaults, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(faults.bits())
}
