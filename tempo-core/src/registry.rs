//! Tuning-set configuration and registry
//!
//! [`TuningSetConfig`] is the closed set of dispatch strategies, tagged by
//! `type` in configuration files:
//!
//! ```toml
//! [[tuning_sets]]
//! name = "steady"
//! type = "poisson"
//! expected_actions_per_second = 200.0
//! ```
//!
//! [`TuningSetRegistry`] maps configured names to strategies and builds a fresh
//! instance on each lookup.

use crate::seed::{components, derive_named_seed};
use crate::tuning::{
    ParallelismLimitedLoad, ParallelismLimitedLoadConfig, PatternLoad, PoissonLoad,
    PoissonLoadConfig, QpsLoadConfig, RampLoadConfig, RandomizedLoad, RandomizedLoadConfig,
    RandomizedTimeLimitedLoad, RandomizedTimeLimitedLoadConfig, SteppedLoad, SteppedLoadConfig,
    TimeLimitedLoad, TimeLimitedLoadConfig, TuningSet,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Dispatch strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TuningSetConfig {
    /// Fixed gap of `1 / qps`
    Qps(QpsLoadConfig),
    /// Uniform gaps averaging `average_qps`
    Randomized(RandomizedLoadConfig),
    /// Bursts of `burst_size` separated by `step_delay`
    Stepped(SteppedLoadConfig),
    /// Even spread over `time_limit`
    TimeLimited(TimeLimitedLoadConfig),
    /// Uniform random offsets within `time_limit`
    RandomizedTimeLimited(RandomizedTimeLimitedLoadConfig),
    /// At most `parallelism_limit` in flight
    ParallelismLimited(ParallelismLimitedLoadConfig),
    /// Fixed gaps following a linear rate ramp
    Ramp(RampLoadConfig),
    /// Exponential gaps (Poisson arrivals)
    Poisson(PoissonLoadConfig),
}

fn check_rate(field: &str, rate: f64) -> Result<()> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(Error::Config(format!("{field} must be a finite number > 0, got {rate}")));
    }
    Ok(())
}

fn check_duration(field: &str, duration: Duration) -> Result<()> {
    if duration.is_zero() {
        return Err(Error::Config(format!("{field} must be > 0")));
    }
    Ok(())
}

fn check_count(field: &str, count: usize) -> Result<()> {
    if count == 0 {
        return Err(Error::Config(format!("{field} must be > 0")));
    }
    Ok(())
}

impl TuningSetConfig {
    /// Configuration tag, as written in `type = "..."`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Qps(_) => "qps",
            Self::Randomized(_) => "randomized",
            Self::Stepped(_) => "stepped",
            Self::TimeLimited(_) => "time-limited",
            Self::RandomizedTimeLimited(_) => "randomized-time-limited",
            Self::ParallelismLimited(_) => "parallelism-limited",
            Self::Ramp(_) => "ramp",
            Self::Poisson(_) => "poisson",
        }
    }

    /// Reject parameters for which the strategy is undefined
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Qps(c) => check_rate("qps", c.qps),
            Self::Randomized(c) => check_rate("average_qps", c.average_qps),
            Self::Stepped(c) => check_count("burst_size", c.burst_size),
            Self::TimeLimited(c) => check_duration("time_limit", c.time_limit),
            Self::RandomizedTimeLimited(c) => check_duration("time_limit", c.time_limit),
            Self::ParallelismLimited(c) => check_count("parallelism_limit", c.parallelism_limit),
            Self::Ramp(c) => {
                check_rate("start_qps", c.start_qps)?;
                check_rate("end_qps", c.end_qps)?;
                check_duration("duration", c.duration)
            }
            Self::Poisson(c) => {
                check_rate("expected_actions_per_second", c.expected_actions_per_second)
            }
        }
    }

    /// Seed component for strategies that consume randomness
    fn seed_component(&self) -> Option<&'static str> {
        match self {
            Self::Randomized(_) => Some(components::RANDOMIZED_LOAD),
            Self::RandomizedTimeLimited(_) => Some(components::RANDOMIZED_TIME_LIMITED_LOAD),
            Self::Poisson(_) => Some(components::POISSON_LOAD),
            _ => None,
        }
    }

    /// Validate and construct the strategy
    ///
    /// `seed` only affects randomized strategies (None = use entropy).
    pub fn build(&self, seed: Option<u64>) -> Result<Box<dyn TuningSet>> {
        self.validate()?;

        let tuning_set: Box<dyn TuningSet> = match *self {
            Self::Qps(c) => Box::new(PatternLoad::qps(c)),
            Self::Randomized(c) => Box::new(RandomizedLoad::new(c, seed)?),
            Self::Stepped(c) => Box::new(SteppedLoad::new(c)),
            Self::TimeLimited(c) => Box::new(TimeLimitedLoad::new(c)),
            Self::RandomizedTimeLimited(c) => Box::new(RandomizedTimeLimitedLoad::new(c, seed)?),
            Self::ParallelismLimited(c) => Box::new(ParallelismLimitedLoad::new(c)),
            Self::Ramp(c) => Box::new(PatternLoad::ramp(c)),
            Self::Poisson(c) => Box::new(PoissonLoad::with_seed(c, seed)),
        };
        Ok(tuning_set)
    }
}

/// A configured strategy with the name experiments refer to it by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct NamedTuningSet {
    pub name: String,
    #[serde(flatten)]
    pub config: TuningSetConfig,
}

/// Name -> strategy lookup
///
/// Each [`get`](Self::get) builds a new instance. With a master seed, every
/// randomized strategy gets its own seed derived from its component and name,
/// so runs are reproducible and two entries never share an arrival sequence.
#[derive(Debug, Default)]
pub struct TuningSetRegistry {
    configs: BTreeMap<String, TuningSetConfig>,
    master_seed: Option<u64>,
}

impl TuningSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry whose randomized strategies derive seeds from `master_seed`
    pub fn with_seed(master_seed: Option<u64>) -> Self {
        Self { configs: BTreeMap::new(), master_seed }
    }

    /// Build a registry from a list of named configurations
    pub fn from_configs(configs: &[NamedTuningSet], master_seed: Option<u64>) -> Result<Self> {
        let mut registry = Self::with_seed(master_seed);
        for named in configs {
            registry.register(&named.name, named.config.clone())?;
        }
        Ok(registry)
    }

    /// Add a named strategy; names must be unique and non-empty
    pub fn register(&mut self, name: &str, config: TuningSetConfig) -> Result<()> {
        if name.is_empty() {
            return Err(Error::Config("Tuning set name cannot be empty".to_string()));
        }
        if self.configs.contains_key(name) {
            return Err(Error::Config(format!("Duplicate tuning set name '{name}'")));
        }
        config.validate().map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("Tuning set '{name}': {msg}")),
            other => other,
        })?;

        tracing::debug!(name, kind = config.kind(), "Registered tuning set");
        self.configs.insert(name.to_string(), config);
        Ok(())
    }

    /// Build a fresh instance of the strategy registered as `name`
    pub fn get(&self, name: &str) -> Result<Box<dyn TuningSet>> {
        let config = self.configs.get(name).ok_or_else(|| {
            Error::Config(format!(
                "Unknown tuning set '{}'. Registered: {}",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })?;

        let seed = match (self.master_seed, config.seed_component()) {
            (Some(master), Some(component)) => Some(derive_named_seed(master, component, name)),
            _ => None,
        };
        config.build(seed)
    }

    pub fn config(&self, name: &str) -> Option<&TuningSetConfig> {
        self.configs.get(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
