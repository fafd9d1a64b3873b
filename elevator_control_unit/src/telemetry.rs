//! Telemetry sinks.
//!
//! The controller produces one [`ElevatorTelemetry`] per tick; a sink decides
//! what to do with it. [`TracingSink`] turns it into structured log events,
//! [`RecordingSink`] keeps it in memory.

use elevator_common::elevator::state::Side;
use elevator_common::elevator::telemetry::ElevatorTelemetry;
use tracing::{debug, info, warn};

/// Consumer of per-tick telemetry. Must not block.
pub trait TelemetrySink {
    /// Accept one tick's snapshot.
    fn publish(&mut self, telemetry: &ElevatorTelemetry);
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for &mut T {
    fn publish(&mut self, telemetry: &ElevatorTelemetry) {
        (**self).publish(telemetry);
    }
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Box<T> {
    fn publish(&mut self, telemetry: &ElevatorTelemetry) {
        (**self).publish(telemetry);
    }
}

// ─── Tracing ────────────────────────────────────────────────────────

/// Emits a `tracing` event every `interval` ticks.
///
/// Ticks carrying faults are always emitted, at `warn` level.
#[derive(Debug, Clone)]
pub struct TracingSink {
    interval: u64,
    published: u64,
}

impl TracingSink {
    /// Sink emitting every `interval` ticks (0 is treated as 1).
    pub fn new(interval: u32) -> Self {
        Self {
            interval: u64::from(interval.max(1)),
            published: 0,
        }
    }

    /// Events emitted so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    fn is_due(&self, telemetry: &ElevatorTelemetry) -> bool {
        !telemetry.faults.is_empty() || telemetry.tick % self.interval == 0
    }
}

impl TelemetrySink for TracingSink {
    fn publish(&mut self, t: &ElevatorTelemetry) {
        if !self.is_due(t) {
            return;
        }
        self.published += 1;

        let left = t.side(Side::Left);
        let right = t.side(Side::Right);
        if t.faults.is_empty() {
            info!(
                target: "elevator::telemetry",
                tick = t.tick,
                state = t.state,
                request = t.request,
                left_position = ?left.position,
                right_position = ?right.position,
                left_error = ?left.tracking_error,
                right_error = ?right.tracking_error,
                profile_elapsed = ?t.profile_elapsed,
                "telemetry"
            );
        } else {
            warn!(
                target: "elevator::telemetry",
                tick = t.tick,
                state = t.state,
                faults = ?t.faults,
                skipped = t.skipped,
                left_position = ?left.position,
                right_position = ?right.position,
                "telemetry with faults"
            );
        }
    }
}

// ─── Recording ──────────────────────────────────────────────────────

/// Keeps every snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Vec<ElevatorTelemetry>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ElevatorTelemetry] {
        &self.records
    }

    pub fn last(&self) -> Option<&ElevatorTelemetry> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        debug!(dropped = self.records.len(), "recording sink cleared");
        self.records.clear();
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, telemetry: &ElevatorTelemetry) {
        self.records.push(telemetry.clone());
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
