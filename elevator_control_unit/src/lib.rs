//! # Elevator Control Unit Library
//!
//! Periodic motion-control core for a dual-motor elevator. Every tick reads
//! both actuators' positions, applies any pending state request, and hands
//! each motor controller a position reference plus feedforward.
//!
//! ## Layers
//!
//! 1. **Profile**: trapezoidal reference trajectory (pure)
//! 2. **Feedforward**: velocity → effort (pure)
//! 3. **ActuatorPair**: polarity mapping onto two ganged motors
//! 4. **ElevatorController**: Idle / HoldSetpoint / ProfiledMove state machine
//! 5. **CycleRunner**: drift-free periodic loop with timing statistics
//!
//! ## Allocation
//!
//! Nothing in the tick path allocates except the sink the caller chooses.

pub mod actuator;
pub mod config;
pub mod control;
pub mod cycle;
pub mod state;
pub mod telemetry;
