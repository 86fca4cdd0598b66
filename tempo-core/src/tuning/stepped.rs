//! Burst dispatch: `burst_size` launches back to back, then a fixed pause

use super::{dispatch, Action, TuningSet};
use crate::timing;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Stepped dispatch configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SteppedLoadConfig {
    /// Actions launched per step (must be > 0)
    pub burst_size: usize,
    /// Pause between the start of consecutive steps
    #[serde(with = "humantime_serde")]
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub step_delay: Duration,
}

pub struct SteppedLoad {
    config: SteppedLoadConfig,
}

impl SteppedLoad {
    pub fn new(config: SteppedLoadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SteppedLoadConfig {
        &self.config
    }
}

impl TuningSet for SteppedLoad {
    fn execute(&mut self, actions: Vec<Action>) -> Result<()> {
        let SteppedLoadConfig { burst_size, step_delay } = self.config;
        let burst_size = burst_size.max(1);

        dispatch(self.name(), actions.len(), |launcher| {
            let mut next_step = Instant::now();
            for (index, action) in actions.into_iter().enumerate() {
                if index > 0 && index % burst_size == 0 {
                    next_step += step_delay;
                    timing::sleep_until(next_step);
                }
                launcher.launch(index, action)?;
            }
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "SteppedLoad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::test_support::Recorder;

    #[test]
    fn test_bursts_and_delays() {
        let config = SteppedLoadConfig { burst_size: 4, step_delay: Duration::from_millis(60) };
        let mut load = SteppedLoad::new(config);
        let recorder = Recorder::new();
        let start = Instant::now();

        // 10 actions = bursts of 4, 4, 2 with two pauses and none after the last burst
        load.execute(recorder.actions(10, Duration::ZERO)).unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(120), "too fast: {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(170), "paused after last burst: {:?}", elapsed);

        let times: Vec<Duration> = recorder.start_times().iter().map(|t| *t - start).collect();
        assert!(times[3] < Duration::from_millis(40), "first burst spread out");
        assert!(times[4] >= Duration::from_millis(60));
        assert!(times[8] >= Duration::from_millis(120));
        recorder.assert_each_finished_once(10);
    }

    #[test]
    fn test_single_burst_has_no_delay() {
        let config = SteppedLoadConfig { burst_size: 8, step_delay: Duration::from_secs(5) };
        let mut load = SteppedLoad::new(config);
        let recorder = Recorder::new();
        let start = Instant::now();
        load.execute(recorder.actions(8, Duration::ZERO)).unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(load.config().burst_size, 8);
    }
}
