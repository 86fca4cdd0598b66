//! Statistical distributions for load generation
//!
//! Provides the distributions used by:
//! - Arrival timing (Exponential inter-arrival times for a Poisson process)
//! - Randomized dispatch strategies (Uniform gaps and offsets)
//! - Synthetic workloads (service times)

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution as RandDistribution, LogNormal, Uniform};
use std::time::Duration;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Trait for all distributions
pub trait Distribution: Send {
    /// Sample a value from this distribution
    fn sample(&mut self) -> f64;

    /// Get distribution name
    fn name(&self) -> &'static str;
}

/// Sample one inter-arrival time of a Poisson process with rate `mean_rate`
///
/// Uses inversion sampling of the exponential CDF: with `p` uniform in `[0, 1)`,
/// `-ln(1 - p) / mean_rate` is exponentially distributed with rate `mean_rate`.
///
/// `Rng::random::<f64>()` draws from the half-open interval `[0, 1)`, so `1 - p`
/// is always in `(0, 1]` and the logarithm is finite. `p = 0` yields a zero
/// duration, which is a legitimate immediate arrival.
///
/// # Parameters
/// - `rng`: Uniform random source, advanced by exactly one draw
/// - `mean_rate`: Arrivals per second, must be > 0 (not re-checked here)
pub fn inter_arrival_time<R: Rng + ?Sized>(rng: &mut R, mean_rate: f64) -> Duration {
    let p: f64 = rng.random();
    let secs = -(1.0 - p).ln() / mean_rate;
    // float-to-int casts saturate, and -0.0 becomes 0
    Duration::from_nanos((NANOS_PER_SEC * secs) as u64)
}

/// Exponential distribution (Poisson inter-arrival times)
///
/// Owns its RNG so a seeded instance always replays the same arrival sequence.
pub struct ExponentialDistribution {
    lambda: f64,
    rng: SmallRng,
}

impl ExponentialDistribution {
    pub fn new(lambda: f64) -> anyhow::Result<Self> {
        Self::with_seed(lambda, None)
    }

    pub fn with_seed(lambda: f64, seed: Option<u64>) -> anyhow::Result<Self> {
        if !(lambda.is_finite() && lambda > 0.0) {
            anyhow::bail!("Exponential lambda must be finite and > 0");
        }

        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_os_rng(),
        };

        Ok(Self { lambda, rng })
    }

    /// Sample the next gap between arrivals
    pub fn sample_inter_arrival(&mut self) -> Duration {
        inter_arrival_time(&mut self.rng, self.lambda)
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Distribution for ExponentialDistribution {
    /// Inter-arrival time in seconds
    fn sample(&mut self) -> f64 {
        self.sample_inter_arrival().as_secs_f64()
    }

    fn name(&self) -> &'static str {
        "Exponential"
    }
}

/// Uniform distribution over `[min, max)`
pub struct UniformDistribution {
    min: f64,
    max: f64,
    rng: SmallRng,
    dist: Uniform<f64>,
}

impl UniformDistribution {
    pub fn new(min: f64, max: f64) -> anyhow::Result<Self> {
        Self::with_seed(min, max, None)
    }

    pub fn with_seed(min: f64, max: f64, seed: Option<u64>) -> anyhow::Result<Self> {
        if min >= max {
            anyhow::bail!("Uniform min must be < max");
        }

        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_os_rng(),
        };
        let dist = Uniform::new(min, max)?;

        Ok(Self { min, max, rng, dist })
    }

    /// Sample a duration, interpreting the bounds as seconds
    pub fn sample_duration(&mut self) -> Duration {
        Duration::from_nanos((NANOS_PER_SEC * self.sample()) as u64)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Distribution for UniformDistribution {
    fn sample(&mut self) -> f64 {
        self.dist.sample(&mut self.rng)
    }

    fn name(&self) -> &'static str {
        "Uniform"
    }
}

/// Lognormal distribution, parameterized by the underlying normal's `mu` and `sigma`
pub struct LognormalDistribution {
    mu: f64,
    sigma: f64,
    rng: SmallRng,
    dist: LogNormal<f64>,
}

impl LognormalDistribution {
    pub fn new(mu: f64, sigma: f64) -> anyhow::Result<Self> {
        Self::with_seed(mu, sigma, None)
    }

    pub fn with_seed(mu: f64, sigma: f64, seed: Option<u64>) -> anyhow::Result<Self> {
        if sigma <= 0.0 {
            anyhow::bail!("Lognormal sigma must be > 0");
        }

        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_os_rng(),
        };
        let dist = LogNormal::new(mu, sigma)?;

        Ok(Self { mu, sigma, rng, dist })
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Distribution for LognormalDistribution {
    fn sample(&mut self) -> f64 {
        self.dist.sample(&mut self.rng)
    }

    fn name(&self) -> &'static str {
        "Lognormal"
    }
}
