//! Elevator feedforward.
//!
//! Static friction (Ks × sign(v)), gravity (Kg), velocity (Kv × v) and
//! optional acceleration (Ka × a). Zero gains disable each component.

use elevator_common::elevator::config::FeedforwardGains;

/// Feedforward model, evaluated once per tick per actuator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedforward {
    gains: FeedforwardGains,
}

impl Feedforward {
    /// Wrap a set of gains.
    pub const fn new(gains: FeedforwardGains) -> Self {
        Self { gains }
    }

    /// The configured gains.
    #[inline]
    pub const fn gains(&self) -> &FeedforwardGains {
        &self.gains
    }

    /// Effort for a reference velocity.
    ///
    /// ```text
    /// ff = Ks × sign(v) + Kg + Kv × v
    /// ```
    #[inline]
    pub fn effort(&self, velocity: f64) -> f64 {
        self.gains.ks * sign(velocity) + self.gains.kg + self.gains.kv * velocity
    }

    /// [`effort`](Self::effort) plus the acceleration term `Ka × a`.
    #[inline]
    pub fn effort_with_acceleration(&self, velocity: f64, acceleration: f64) -> f64 {
        let mut output = self.effort(velocity);
        if self.gains.ka != 0.0 {
            output += self.gains.ka * acceleration;
        }
        output
    }
}

impl Default for Feedforward {
    fn default() -> Self {
        Self::new(FeedforwardGains::default())
    }
}

/// Sign with `sign(0) = 0`, unlike `f64::signum`.
#[inline]
pub fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
