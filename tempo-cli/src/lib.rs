//! Tempo CLI library
//!
//! Profile configuration, synthetic workload and reporting, exposed for
//! testing.

pub mod config;
pub mod experiment;
pub mod output;
pub mod workload;
