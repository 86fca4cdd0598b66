//! Workload shaping

pub mod patterns;

pub use patterns::{ConstantPattern, LoadPattern, RampPattern};
