//! Randomized dispatch strategies
//!
//! - [`RandomizedLoad`]: gaps drawn uniformly from `[0, 2 / average_qps)`, which
//!   averages to `average_qps` launches per second.
//! - [`RandomizedTimeLimitedLoad`]: every action gets an independent uniform
//!   offset within the time limit; launches happen in offset order.

use super::{dispatch, Action, TuningSet};
use crate::timing;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tempo_common::UniformDistribution;

/// Randomized-gap configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RandomizedLoadConfig {
    /// Mean launches per second (must be > 0)
    pub average_qps: f64,
}

/// Randomized-offset configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RandomizedTimeLimitedLoadConfig {
    /// Window in which all launches happen (must be > 0)
    #[serde(with = "humantime_serde")]
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub time_limit: Duration,
}

/// Uniformly randomized gaps around a mean rate
pub struct RandomizedLoad {
    config: RandomizedLoadConfig,
    gaps: UniformDistribution,
}

impl RandomizedLoad {
    pub fn new(config: RandomizedLoadConfig, seed: Option<u64>) -> Result<Self> {
        let gaps = UniformDistribution::with_seed(0.0, 2.0 / config.average_qps, seed)
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self { config, gaps })
    }

    pub fn config(&self) -> &RandomizedLoadConfig {
        &self.config
    }
}

impl TuningSet for RandomizedLoad {
    fn execute(&mut self, actions: Vec<Action>) -> Result<()> {
        let gaps = &mut self.gaps;

        dispatch("RandomizedLoad", actions.len(), |launcher| {
            let mut next_launch = Instant::now();
            for (index, action) in actions.into_iter().enumerate() {
                timing::sleep_until(next_launch);
                launcher.launch(index, action)?;
                next_launch += gaps.sample_duration();
            }
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "RandomizedLoad"
    }
}

/// Independent uniform launch offsets within a time window
pub struct RandomizedTimeLimitedLoad {
    config: RandomizedTimeLimitedLoadConfig,
    offsets: UniformDistribution,
}

impl RandomizedTimeLimitedLoad {
    pub fn new(config: RandomizedTimeLimitedLoadConfig, seed: Option<u64>) -> Result<Self> {
        let offsets =
            UniformDistribution::with_seed(0.0, config.time_limit.as_secs_f64(), seed)
                .map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self { config, offsets })
    }

    pub fn config(&self) -> &RandomizedTimeLimitedLoadConfig {
        &self.config
    }
}

impl TuningSet for RandomizedTimeLimitedLoad {
    fn execute(&mut self, actions: Vec<Action>) -> Result<()> {
        let mut scheduled: Vec<(Duration, usize, Action)> = actions
            .into_iter()
            .enumerate()
            .map(|(index, action)| (self.offsets.sample_duration(), index, action))
            .collect();
        // Ties keep input order
        scheduled.sort_by_key(|(offset, index, _)| (*offset, *index));

        dispatch("RandomizedTimeLimitedLoad", scheduled.len(), |launcher| {
            let start = Instant::now();
            for (offset, index, action) in scheduled {
                timing::sleep_until(start + offset);
                launcher.launch(index, action)?;
            }
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "RandomizedTimeLimitedLoad"
    }
}
