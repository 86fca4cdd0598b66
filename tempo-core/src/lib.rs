//! Tempo Core Library
//!
//! This crate provides the dispatch strategies of the tempo load-generation
//! scheduler: given an ordered batch of actions, a [`TuningSet`] decides when
//! each one is launched, runs each on its own thread, and returns once all of
//! them have finished.
//!
//! The centerpiece is [`PoissonLoad`], which launches actions as a Poisson
//! arrival process. [`TuningSetRegistry`] builds any strategy from its
//! configuration.

pub mod error;
pub mod registry;
pub mod seed;
pub mod stats;
pub mod threading;
pub mod timing;
pub mod tuning;
pub mod workload;

pub use error::{Error, Result};
pub use registry::{NamedTuningSet, TuningSetConfig, TuningSetRegistry};
pub use tuning::{Action, PoissonLoad, PoissonLoadConfig, TuningSet};
