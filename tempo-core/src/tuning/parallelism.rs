//! Capacity-bounded dispatch
//!
//! Launches as fast as possible while keeping at most `parallelism_limit`
//! actions running. This is the only strategy with a concurrency cap.

use super::{dispatch, Action, TuningSet};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Parallelism-limited dispatch configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ParallelismLimitedLoadConfig {
    /// Maximum number of actions in flight (must be > 0)
    pub parallelism_limit: usize,
}

pub struct ParallelismLimitedLoad {
    config: ParallelismLimitedLoadConfig,
}

impl ParallelismLimitedLoad {
    pub fn new(config: ParallelismLimitedLoadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParallelismLimitedLoadConfig {
        &self.config
    }
}

impl TuningSet for ParallelismLimitedLoad {
    fn execute(&mut self, actions: Vec<Action>) -> Result<()> {
        let limit = self.config.parallelism_limit.max(1);

        dispatch(self.name(), actions.len(), |launcher| {
            for (index, action) in actions.into_iter().enumerate() {
                launcher.wait_below(limit);
                launcher.launch(index, action)?;
            }
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "ParallelismLimitedLoad"
    }
}
