//! Common utilities for tempo
//!
//! This crate provides shared utilities used by multiple tempo crates:
//! - `distributions`: Arrival-time and service-time distributions

pub mod distributions;

pub use distributions::{
    inter_arrival_time, Distribution, ExponentialDistribution, LognormalDistribution,
    UniformDistribution,
};
