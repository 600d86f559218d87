//! Feedforward from a linear motor model.

use serde::Deserialize;

/// Motor model feedforward, `kS·sign(v) + kV·v + kA·a`.
///
/// With gains characterised in volts the output is in volts.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SimpleMotorFeedforward {
    /// Static friction gain
    pub k_s: f64,

    /// Velocity gain
    pub k_v: f64,

    /// Acceleration gain
    pub k_a: f64,
}

impl SimpleMotorFeedforward {
    pub fn new(k_s: f64, k_v: f64, k_a: f64) -> Self {
        Self { k_s, k_v, k_a }
    }

    /// Output needed to hold `velocity` while accelerating at `acceleration`.
    pub fn calculate(&self, velocity: f64, acceleration: f64) -> f64 {
        // f64::signum gives 1 for +0, static friction only applies when moving
        let sign = if velocity == 0.0 { 0.0 } else { velocity.signum() };

        self.k_s * sign + self.k_v * velocity + self.k_a * acceleration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate() {
        let ff = SimpleMotorFeedforward::new(0.5, 2.0, 0.1);
        assert_eq!(ff.calculate(0.0, 0.0), 0.0);
        assert!((ff.calculate(1.0, 2.0) - 2.7).abs() < 1e-9);
        assert!((ff.calculate(-1.0, 0.0) + 2.5).abs() < 1e-9);
    }
}
