//! Synthetic actions
//!
//! Every action records its start into a shared [`RunRecorder`], sleeps for a
//! sampled service time, and either records its completion or panics. Service
//! times and faults are drawn up front on the calling thread, so a seeded
//! profile always produces the same batch.

use crate::config::{ServiceTimeConfig, WorkloadConfig};
use anyhow::Result;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution as _};
use std::sync::Arc;
use std::time::Duration;
use tempo_common::{
    Distribution, ExponentialDistribution, LognormalDistribution, UniformDistribution,
};
use tempo_core::seed::{components, derive_seed};
use tempo_core::stats::RunRecorder;
use tempo_core::Action;

/// Draws service times according to a [`ServiceTimeConfig`]
pub enum ServiceTimeSampler {
    Fixed(Duration),
    Random(Box<dyn Distribution>),
}

impl ServiceTimeSampler {
    pub fn new(config: &ServiceTimeConfig, seed: Option<u64>) -> Result<Self> {
        let sampler = match *config {
            ServiceTimeConfig::Fixed { duration } => Self::Fixed(duration),
            ServiceTimeConfig::Exponential { mean } => Self::Random(Box::new(
                ExponentialDistribution::with_seed(1.0 / mean.as_secs_f64(), seed)?,
            )),
            ServiceTimeConfig::Uniform { min, max } => Self::Random(Box::new(
                UniformDistribution::with_seed(min.as_secs_f64(), max.as_secs_f64(), seed)?,
            )),
            ServiceTimeConfig::Lognormal { median, sigma } => Self::Random(Box::new(
                LognormalDistribution::with_seed(median.as_secs_f64().ln(), sigma, seed)?,
            )),
        };
        Ok(sampler)
    }

    pub fn sample(&mut self) -> Duration {
        match self {
            Self::Fixed(duration) => *duration,
            // Samples are in seconds; the cast saturates on absurd values
            Self::Random(dist) => Duration::from_nanos((dist.sample().max(0.0) * 1e9) as u64),
        }
    }
}

/// Build `count` synthetic actions reporting into `recorder`
///
/// With `seed`, service times and faults are derived from it and are
/// reproducible; otherwise they use OS entropy.
pub fn build_actions(
    count: usize,
    workload: &WorkloadConfig,
    seed: Option<u64>,
    recorder: &Arc<RunRecorder>,
) -> Result<Vec<Action>> {
    let mut service_times = ServiceTimeSampler::new(
        &workload.service_time,
        seed.map(|s| derive_seed(s, components::SERVICE_TIME)),
    )?;

    let faults = Bernoulli::new(workload.fault_probability)?;
    let mut fault_rng = match seed {
        Some(s) => SmallRng::seed_from_u64(derive_seed(s, components::FAULT_INJECTION)),
        None => SmallRng::from_os_rng(),
    };

    let actions = (0..count)
        .map(|index| {
            let service_time = service_times.sample();
            let faulty = faults.sample(&mut fault_rng);
            let recorder = Arc::clone(recorder);

            Box::new(move || {
                let started = recorder.record_start();
                if !service_time.is_zero() {
                    std::thread::sleep(service_time);
                }
                if faulty {
                    panic!("injected fault in action {index}");
                }
                recorder.record_completion(started);
            }) as Action
        })
        .collect();

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sampler() {
        let mut sampler = ServiceTimeSampler::new(
            &ServiceTimeConfig::Fixed { duration: Duration::from_millis(3) },
            None,
        )
        .unwrap();
        assert_eq!(sampler.sample(), Duration::from_millis(3));
    }

    #[test]
    fn test_uniform_sampler_in_range() {
        let config = ServiceTimeConfig::Uniform {
            min: Duration::from_millis(1),
            max: Duration::from_millis(2),
        };
        let mut sampler = ServiceTimeSampler::new(&config, Some(5)).unwrap();
        for _ in 0..500 {
            let d = sampler.sample();
            assert!(d >= Duration::from_micros(999) && d < Duration::from_millis(2), "{d:?}");
        }
    }

    #[test]
    fn test_lognormal_median() {
        let config =
            ServiceTimeConfig::Lognormal { median: Duration::from_millis(10), sigma: 0.5 };
        let mut sampler = ServiceTimeSampler::new(&config, Some(11)).unwrap();
        let mut samples: Vec<Duration> = (0..10_001).map(|_| sampler.sample()).collect();
        samples.sort_unstable();
        let median = samples[5_000].as_secs_f64();
        assert!((median - 0.010).abs() < 0.001, "median {median}");
    }

    #[test]
    fn test_seeded_batches_are_reproducible() {
        let workload = WorkloadConfig {
            service_time: ServiceTimeConfig::Exponential { mean: Duration::from_millis(1) },
            fault_probability: 0.3,
        };

        let run = |seed| {
            let recorder = Arc::new(RunRecorder::new().unwrap());
            let actions = build_actions(40, &workload, Some(seed), &recorder).unwrap();
            let mut faulted = 0;
            for action in actions {
                if std::panic::catch_unwind(std::panic::AssertUnwindSafe(action)).is_err() {
                    faulted += 1;
                }
            }
            (faulted, recorder.completed())
        };

        let (faulted, completed) = run(9);
        assert_eq!(run(9), (faulted, completed));
        assert_eq!(faulted + completed as usize, 40);
        assert!(faulted > 0 && faulted < 40);
    }

    #[test]
    fn test_no_faults_at_zero_probability() {
        let recorder = Arc::new(RunRecorder::new().unwrap());
        let actions =
            build_actions(25, &WorkloadConfig::default(), Some(1), &recorder).unwrap();
        for action in actions {
            action();
        }
        assert_eq!(recorder.started(), 25);
        assert_eq!(recorder.completed(), 25);
    }

    #[test]
    fn test_rejects_bad_fault_probability() {
        let workload = WorkloadConfig { fault_probability: 1.5, ..Default::default() };
        let recorder = Arc::new(RunRecorder::new().unwrap());
        assert!(build_actions(1, &workload, None, &recorder).is_err());
    }
}
