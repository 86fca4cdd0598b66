//! Even spread: n launches at fixed gaps of `time_limit / n`

use super::{dispatch, Action, TuningSet};
use crate::timing;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Time-limited dispatch configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TimeLimitedLoadConfig {
    /// Window over which the batch is spread (must be > 0)
    #[serde(with = "humantime_serde")]
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub time_limit: Duration,
}

pub struct TimeLimitedLoad {
    config: TimeLimitedLoadConfig,
}

impl TimeLimitedLoad {
    pub fn new(config: TimeLimitedLoadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimeLimitedLoadConfig {
        &self.config
    }
}

impl TuningSet for TimeLimitedLoad {
    fn execute(&mut self, actions: Vec<Action>) -> Result<()> {
        let total = actions.len();
        let gap = if total == 0 {
            Duration::ZERO
        } else {
            self.config.time_limit.div_f64(total as f64)
        };

        dispatch(self.name(), total, |launcher| {
            let mut next_launch = Instant::now();
            for (index, action) in actions.into_iter().enumerate() {
                timing::sleep_until(next_launch);
                launcher.launch(index, action)?;
                next_launch += gap;
            }
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "TimeLimitedLoad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::test_support::Recorder;

    #[test]
    fn test_spread_over_time_limit() {
        let config = TimeLimitedLoadConfig { time_limit: Duration::from_millis(200) };
        let mut load = TimeLimitedLoad::new(config);
        let recorder = Recorder::new();
        let start = Instant::now();

        // Last launch lands at 9/10 of the window
        load.execute(recorder.actions(10, Duration::ZERO)).unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(180), "too fast: {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(300), "too slow: {:?}", elapsed);
        assert_eq!(recorder.start_order(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_batch() {
        let mut load =
            TimeLimitedLoad::new(TimeLimitedLoadConfig { time_limit: Duration::from_secs(30) });
        let start = Instant::now();
        load.execute(Vec::new()).unwrap();
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(load.config().time_limit, Duration::from_secs(30));
    }
}
