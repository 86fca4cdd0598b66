//! Seed derivation for reproducible randomness
//!
//! Derives component-specific seeds from a master seed using SHA-256:
//! - Deterministic: same master + component = same derived seed
//! - Independent: different components get unrelated seeds
//!
//! # Example
//!
//! ```
//! use tempo_core::seed::derive_seed;
//!
//! let master_seed = 42;
//! let poisson = derive_seed(master_seed, "poisson_load/steady");
//! let workload = derive_seed(master_seed, "service_time");
//!
//! assert_eq!(derive_seed(42, "test"), derive_seed(42, "test"));
//! assert_ne!(poisson, workload);
//! ```

use sha2::{Digest, Sha256};

/// Derive a component-specific seed from a master seed using SHA-256
///
/// # Parameters
/// - `master_seed`: The master seed (e.g., from the profile's `experiment.seed`)
/// - `component`: Component identifier (see [`components`])
pub fn derive_seed(master_seed: u64, component: &str) -> u64 {
    let mut hasher = Sha256::new();

    // Big-endian so the derivation is platform independent
    hasher.update(master_seed.to_be_bytes());
    hasher.update(component.as_bytes());

    let result = hasher.finalize();

    u64::from_be_bytes([
        result[0], result[1], result[2], result[3], result[4], result[5], result[6], result[7],
    ])
}

/// Derive a seed for a named instance of a component, e.g. `poisson_load/steady`
pub fn derive_named_seed(master_seed: u64, component: &str, name: &str) -> u64 {
    derive_seed(master_seed, &format!("{component}/{name}"))
}

/// Standard component names for seed derivation
pub mod components {
    pub const POISSON_LOAD: &str = "poisson_load";
    pub const RANDOMIZED_LOAD: &str = "randomized_load";
    pub const RANDOMIZED_TIME_LIMITED_LOAD: &str = "randomized_time_limited_load";
    pub const SERVICE_TIME: &str = "service_time";
    pub const FAULT_INJECTION: &str = "fault_injection";
}
