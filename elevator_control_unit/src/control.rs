//! Control engine root.
//!
//! Motion reference generation and feedforward. The position loop itself runs
//! on the motor controllers; this side only produces references and efforts.

pub mod feedforward;
pub mod profile;
