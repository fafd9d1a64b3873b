//! Elevator Common Library
//!
//! Shared types, constants and configuration loading for the elevator
//! control workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Cycle timing bounds and default calibration values
//! - [`config`] - Configuration loading trait, shared config and errors
//! - [`motion`] - Kinematic constraints and reference motion states
//! - [`elevator`] - Operating states, requests, errors, config tables, telemetry
//! - [`hal`] - Actuator device boundary trait
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use elevator_common::prelude::*;
//!
//! let constraints = KinematicConstraints::new(50.0, 100.0);
//! assert!(constraints.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod elevator;
pub mod hal;
pub mod motion;
pub mod prelude;
