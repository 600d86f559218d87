//! # Operator inputs
//!
//! Continuous ranges (sticks, triggers) and switches (buttons) polled once per
//! control cycle. Any closure of the right shape is an input, which is how
//! tests and the simulated executable feed the routines.

/// A continuous input, nominally in `[-1, 1]`. Values outside that range are
/// clamped by the routines, never rejected.
pub trait ContinuousRange {
    fn read(&self) -> f64;
}

/// A discrete on/off input.
pub trait Switch {
    fn is_triggered(&self) -> bool;
}

impl<F> ContinuousRange for F
where
    F: Fn() -> f64,
{
    fn read(&self) -> f64 {
        self()
    }
}

impl<F> Switch for F
where
    F: Fn() -> bool,
{
    fn is_triggered(&self) -> bool {
        self()
    }
}
