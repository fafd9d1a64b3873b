//! Error taxonomy and per-tick fault flags for the elevator.
//!
//! `InvalidConstraints` is fatal to one profile's creation, `DeviceUnavailable`
//! is recoverable per tick, `UnrecognizedState` is coerced to Idle. None of
//! them ever escapes a control tick; they surface as [`TickFaults`] instead.

use bitflags::bitflags;
use thiserror::Error;

use super::state::Side;

/// Errors raised by the elevator core and its actuator devices.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ElevatorError {
    /// A velocity or acceleration limit is non-positive or non-finite.
    #[error("invalid kinematic constraints: max_velocity={max_velocity}, max_acceleration={max_acceleration}")]
    InvalidConstraints {
        /// Offending velocity limit.
        max_velocity: f64,
        /// Offending acceleration limit.
        max_acceleration: f64,
    },

    /// The sensor/actuator link of one side is down.
    #[error("{side} actuator unavailable")]
    DeviceUnavailable {
        /// Side whose link failed.
        side: Side,
    },

    /// A raw request code does not name any operating state.
    #[error("unrecognized state request code {code}")]
    UnrecognizedState {
        /// The rejected code.
        code: u8,
    },

    /// Actuator polarity is not "exactly one side inverted".
    #[error("invalid actuator polarity: exactly one side must be inverted")]
    InvalidPolarity,
}

impl ElevatorError {
    /// Fault flag recorded in telemetry for this error.
    pub const fn fault_flag(&self) -> TickFaults {
        match self {
            Self::InvalidConstraints { .. } => TickFaults::INVALID_CONSTRAINTS,
            Self::DeviceUnavailable { side: Side::Left } => TickFaults::LEFT_UNAVAILABLE,
            Self::DeviceUnavailable { side: Side::Right } => TickFaults::RIGHT_UNAVAILABLE,
            Self::UnrecognizedState { .. } => TickFaults::UNRECOGNIZED_STATE,
            Self::InvalidPolarity => TickFaults::empty(),
        }
    }
}

bitflags! {
    /// Faults observed during a single control tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TickFaults: u8 {
        /// Left actuator read or write failed.
        const LEFT_UNAVAILABLE    = 0x01;
        /// Right actuator read or write failed.
        const RIGHT_UNAVAILABLE   = 0x02;
        /// Profile creation rejected the constraints; fell back to Idle.
        const INVALID_CONSTRAINTS = 0x04;
        /// Unknown request code coerced to Idle.
        const UNRECOGNIZED_STATE  = 0x08;
    }
}

impl TickFaults {
    /// Faults that cause the tick to skip commanding.
    pub const DEVICE_MASK: Self = Self::from_bits_truncate(
        Self::LEFT_UNAVAILABLE.bits() | Self::RIGHT_UNAVAILABLE.bits(),
    );

    /// Returns true if any device link fault is set.
    #[inline]
    pub const fn has_device_fault(&self) -> bool {
        self.intersects(Self::DEVICE_MASK)
    }
}

impl Default for TickFaults {
    fn default() -> Self {
        Self::empty()
    }
}
