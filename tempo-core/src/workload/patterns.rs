//! Load patterns for time-varying launch rates
//!
//! Patterns define how the launch rate changes over the scheduled timeline of a
//! dispatch run. The offset passed to [`LoadPattern::rate_at`] is the *scheduled*
//! offset of a launch, not the observed wall-clock time, so loop overhead does
//! not bend the pattern.

use std::time::Duration;

/// Trait for load patterns
pub trait LoadPattern: Send + Sync {
    /// Get target rate at a given offset from the start of the run
    ///
    /// # Returns
    /// Target rate in actions per second
    fn rate_at(&self, elapsed: Duration) -> f64;
}

/// Constant rate (no variation)
#[derive(Debug, Clone, Copy)]
pub struct ConstantPattern {
    rate: f64,
}

impl ConstantPattern {
    /// Create a new constant pattern
    ///
    /// # Parameters
    /// - `rate`: Target rate in actions per second
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl LoadPattern for ConstantPattern {
    fn rate_at(&self, _elapsed: Duration) -> f64 {
        self.rate
    }
}

/// Ramp pattern (linearly increase/decrease)
///
/// Gradually changes the rate from start_rate to end_rate over a duration and
/// holds end_rate afterwards.
#[derive(Debug, Clone, Copy)]
pub struct RampPattern {
    start_rate: f64,
    end_rate: f64,
    duration: Duration,
}

impl RampPattern {
    /// Create a new ramp pattern
    ///
    /// # Parameters
    /// - `start_rate`: Initial rate in actions per second
    /// - `end_rate`: Final rate in actions per second
    /// - `duration`: Time to ramp from start to end
    pub fn new(start_rate: f64, end_rate: f64, duration: Duration) -> Self {
        Self { start_rate, end_rate, duration }
    }
}

impl LoadPattern for RampPattern {
    fn rate_at(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return self.end_rate;
        }
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        self.start_rate + (self.end_rate - self.start_rate) * progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_pattern() {
        let pattern = ConstantPattern::new(1000.0);
        assert_eq!(pattern.rate_at(Duration::ZERO), 1000.0);
        assert_eq!(pattern.rate_at(Duration::from_secs(100)), 1000.0);
    }

    #[test]
    fn test_ramp_pattern() {
        let pattern = RampPattern::new(100.0, 1000.0, Duration::from_secs(10));

        assert_eq!(pattern.rate_at(Duration::ZERO), 100.0);
        assert!((pattern.rate_at(Duration::from_secs(5)) - 550.0).abs() < 1e-9);
        assert_eq!(pattern.rate_at(Duration::from_secs(10)), 1000.0);
        // Holds the end rate after the ramp
        assert_eq!(pattern.rate_at(Duration::from_secs(20)), 1000.0);
    }

    #[test]
    fn test_ramp_down() {
        let pattern = RampPattern::new(1000.0, 100.0, Duration::from_secs(10));
        assert!((pattern.rate_at(Duration::from_secs(5)) - 550.0).abs() < 1e-9);
        assert_eq!(pattern.rate_at(Duration::from_secs(10)), 100.0);
    }

    #[test]
    fn test_zero_length_ramp_uses_end_rate() {
        let pattern = RampPattern::new(10.0, 20.0, Duration::ZERO);
        assert_eq!(pattern.rate_at(Duration::ZERO), 20.0);
    }
}
