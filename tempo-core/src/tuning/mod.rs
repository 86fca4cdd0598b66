//! Dispatch strategies ("tuning sets")
//!
//! A tuning set consumes an ordered batch of actions, decides *when* each one
//! is launched, and returns only after every launched action has finished.
//!
//! ## Architecture
//!
//! ```text
//! TuningSet (execute a batch)
//! ├── PatternLoad          fixed gaps following a LoadPattern (qps, ramp)
//! ├── RandomizedLoad       uniform gaps in [0, 2/average_qps)
//! ├── SteppedLoad          bursts separated by a fixed delay
//! ├── TimeLimitedLoad      n launches spread evenly over a time limit
//! ├── RandomizedTimeLimitedLoad  uniform offsets within a time limit
//! ├── ParallelismLimitedLoad     at most k actions in flight
//! └── PoissonLoad          exponential gaps (Poisson arrivals)
//! ```
//!
//! Every strategy launches through a [`Launcher`], which owns the
//! [`WaitGroup`] and drains it before the strategy returns, including when a
//! launch fails.

use crate::threading::WaitGroup;
use crate::{Error, Result};

pub mod parallelism;
pub mod pattern;
pub mod poisson;
pub mod randomized;
pub mod stepped;
pub mod time_limited;

pub use parallelism::{ParallelismLimitedLoad, ParallelismLimitedLoadConfig};
pub use pattern::{PatternLoad, QpsLoadConfig, RampLoadConfig};
pub use poisson::{PoissonLoad, PoissonLoadConfig};
pub use randomized::{
    RandomizedLoad, RandomizedLoadConfig, RandomizedTimeLimitedLoad,
    RandomizedTimeLimitedLoadConfig,
};
pub use stepped::{SteppedLoad, SteppedLoadConfig};
pub use time_limited::{TimeLimitedLoad, TimeLimitedLoadConfig};

/// One opaque unit of work
///
/// Runs once on its own thread. It has no result and no error channel; a panic
/// is contained to the action.
pub type Action = Box<dyn FnOnce() + Send + 'static>;

/// Dispatch strategy contract
pub trait TuningSet: Send {
    /// Launch every action according to this strategy and wait for all of them
    ///
    /// Launch order follows the order of `actions` unless the strategy says
    /// otherwise. Returns `Err(Error::Launch)` only if a thread for an action
    /// could not be created; actions launched before the failure have finished
    /// by the time the error is returned.
    fn execute(&mut self, actions: Vec<Action>) -> Result<()>;

    /// Strategy name for logs
    fn name(&self) -> &'static str;
}

/// Launch handle handed to a strategy's scheduling loop
pub struct Launcher {
    group: WaitGroup,
    strategy: &'static str,
}

impl Launcher {
    /// Start `action` on its own thread without waiting for it
    pub fn launch(&self, index: usize, action: Action) -> Result<()> {
        self.group.start(format!("tempo-action-{index}"), action).map_err(|e| {
            tracing::error!(
                strategy = self.strategy,
                index,
                error = %e,
                "Failed to launch action, aborting dispatch"
            );
            Error::Launch(e)
        })
    }

    /// Block until fewer than `limit` launched actions are still running
    pub fn wait_below(&self, limit: usize) {
        self.group.wait_below(limit);
    }

    /// Number of launched actions still running
    pub fn in_flight(&self) -> usize {
        self.group.in_flight()
    }
}

/// Run one dispatch: schedule, then drain
///
/// `schedule` performs the launches. Whatever it returns, every action it
/// managed to launch has completed before this function returns.
pub fn dispatch<F>(strategy: &'static str, total: usize, schedule: F) -> Result<()>
where
    F: FnOnce(&Launcher) -> Result<()>,
{
    let launcher = Launcher { group: WaitGroup::new(), strategy };

    tracing::debug!(strategy, actions = total, "Scheduling");
    let scheduled = schedule(&launcher);

    tracing::debug!(
        strategy,
        launched = launcher.group.launched(),
        in_flight = launcher.group.in_flight(),
        "Draining"
    );
    launcher.group.wait();

    tracing::debug!(
        strategy,
        launched = launcher.group.launched(),
        panicked = launcher.group.panicked(),
        "Done"
    );
    scheduled
}
