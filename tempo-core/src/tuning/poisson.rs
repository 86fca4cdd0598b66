//! Poisson-arrival dispatch
//!
//! Launch instants form a Poisson process: the gaps between consecutive
//! launches are independent exponential samples with the configured mean rate.
//! Each instant is accumulated from the previous *scheduled* instant rather than
//! from the clock, so time spent launching never shifts later arrivals.

use super::{dispatch, Action, TuningSet};
use crate::timing;
use crate::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tempo_common::inter_arrival_time;

/// Poisson dispatch configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PoissonLoadConfig {
    /// Mean launch rate in actions per second (must be > 0)
    pub expected_actions_per_second: f64,
}

/// Poisson-arrival tuning set
///
/// Concurrency is unbounded: every action gets its own thread as soon as its
/// arrival time comes up, no matter how many earlier actions are still running.
/// A high rate combined with slow actions can therefore create a large number of
/// threads.
pub struct PoissonLoad<R = SmallRng> {
    config: PoissonLoadConfig,
    rng: R,
}

impl PoissonLoad<SmallRng> {
    /// Create a Poisson tuning set seeded from OS entropy
    pub fn new(config: PoissonLoadConfig) -> Self {
        Self::with_seed(config, None)
    }

    /// Create a Poisson tuning set with an optional seed
    ///
    /// # Parameters
    /// - `config`: Mean rate, validated by the caller
    /// - `seed`: Seed for a reproducible arrival sequence (None = use entropy)
    pub fn with_seed(config: PoissonLoadConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng + Send> PoissonLoad<R> {
    /// Create a Poisson tuning set drawing arrivals from `rng`
    pub fn with_rng(config: PoissonLoadConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &PoissonLoadConfig {
        &self.config
    }
}

impl<R: Rng + Send> TuningSet for PoissonLoad<R> {
    fn execute(&mut self, actions: Vec<Action>) -> Result<()> {
        let name = self.name();
        let rate = self.config.expected_actions_per_second;
        let rng = &mut self.rng;

        dispatch(name, actions.len(), |launcher| {
            let mut next_launch = Instant::now();
            for (index, action) in actions.into_iter().enumerate() {
                timing::sleep_until(next_launch);
                launcher.launch(index, action)?;
                next_launch += inter_arrival_time(rng, rate);
            }
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "PoissonLoad"
    }
}
