//! Fixed-gap dispatch following a load pattern
//!
//! The gap after each launch is `1 / rate`, where the rate comes from a
//! [`LoadPattern`] evaluated at the launch's scheduled offset. A constant
//! pattern gives classic fixed-QPS dispatch; a ramp pattern gives a linearly
//! accelerating (or decelerating) launch rate.

use super::{dispatch, Action, TuningSet};
use crate::timing;
use crate::workload::{ConstantPattern, LoadPattern, RampPattern};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Fixed-QPS configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct QpsLoadConfig {
    /// Launches per second (must be > 0)
    pub qps: f64,
}

/// Linear ramp configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RampLoadConfig {
    /// Launch rate at the start of the run (must be > 0)
    pub start_qps: f64,
    /// Launch rate once the ramp is over (must be > 0)
    pub end_qps: f64,
    /// Time to go from `start_qps` to `end_qps`
    #[serde(with = "humantime_serde")]
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub duration: Duration,
}

/// Tuning set launching at the rate given by a load pattern
pub struct PatternLoad<P> {
    pattern: P,
    name: &'static str,
}

impl PatternLoad<ConstantPattern> {
    /// Fixed-QPS dispatch
    pub fn qps(config: QpsLoadConfig) -> Self {
        Self { pattern: ConstantPattern::new(config.qps), name: "QpsLoad" }
    }
}

impl PatternLoad<RampPattern> {
    /// Linearly ramping dispatch
    pub fn ramp(config: RampLoadConfig) -> Self {
        Self {
            pattern: RampPattern::new(config.start_qps, config.end_qps, config.duration),
            name: "RampLoad",
        }
    }
}

impl<P: LoadPattern> TuningSet for PatternLoad<P> {
    fn execute(&mut self, actions: Vec<Action>) -> Result<()> {
        let pattern = &self.pattern;

        dispatch(self.name, actions.len(), |launcher| {
            let start = Instant::now();
            let mut next_launch = start;
            for (index, action) in actions.into_iter().enumerate() {
                timing::sleep_until(next_launch);
                launcher.launch(index, action)?;
                let rate = pattern.rate_at(next_launch - start);
                next_launch += timing::interval_for_rate(rate);
            }
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
