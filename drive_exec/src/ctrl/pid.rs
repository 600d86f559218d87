//! PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::MIN_DT_S;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,

    /// The integral accumulation is held within `[-integral_limit, integral_limit]`
    integral_limit: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains and no integral limit.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            integral: 0f64,
            prev_error: None,
            integral_limit: std::f64::INFINITY,
        }
    }

    /// Limit the magnitude of the integral accumulation.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit.abs();
        self
    }

    /// Get the value of the controller for the given error over a step of
    /// `dt_s` seconds.
    pub fn get(&mut self, error: f64, dt_s: f64) -> f64 {
        let step = dt_s > MIN_DT_S;

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral
        // as adding the raw error would produce a spike compared to normal
        // operation.
        if step {
            self.integral = (self.integral + error * dt_s)
                .max(-self.integral_limit)
                .min(self.integral_limit);
        }

        // Calculate the derivative, for the same reasons as the integral this
        // is zero without a previous error or a real time step.
        let deriv = match self.prev_error {
            Some(e) if step => (error - e) / dt_s,
            _ => 0f64
        };

        let out = 
            self.k_p * error 
            + self.k_i * self.integral 
            + self.k_d * deriv;
        
        self.prev_error = Some(error);

        out
    }

    /// Drive `measurement` towards `setpoint`.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64, dt_s: f64) -> f64 {
        self.get(setpoint - measurement, dt_s)
    }

    /// Clear the integral and derivative memory.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}
