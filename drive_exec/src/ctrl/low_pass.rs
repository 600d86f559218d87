//! Single pole low pass filter.

/// Exponential smoothing, `last = alpha·x + (1 - alpha)·last`.
#[derive(Debug, Clone, Copy)]
pub struct LowPassFilter {
    alpha: f64,
    last: f64,
}

impl LowPassFilter {
    /// Create a filter primed with `initial`, so the output doesn't ramp up
    /// from zero.
    pub fn new(alpha: f64, initial: f64) -> Self {
        Self {
            alpha: alpha.max(0.0).min(1.0),
            last: initial,
        }
    }

    /// Feed a new sample in and get the filtered value.
    pub fn update(&mut self, sample: f64) -> f64 {
        self.last = self.alpha * sample + (1.0 - self.alpha) * self.last;
        self.last
    }

    pub fn value(&self) -> f64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_without_overshoot() {
        let mut f = LowPassFilter::new(0.2, 0.0);
        assert!((f.update(1.0) - 0.2).abs() < 1e-12);
        assert!((f.update(1.0) - 0.36).abs() < 1e-12);

        let mut prev = f.value();
        for _ in 0..200 {
            let v = f.update(1.0);
            assert!(v >= prev && v <= 1.0);
            prev = v;
        }
        assert!((prev - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_primed_value_held() {
        let mut f = LowPassFilter::new(0.2, 3.0);
        assert!((f.update(3.0) - 3.0).abs() < 1e-12);
    }
}
