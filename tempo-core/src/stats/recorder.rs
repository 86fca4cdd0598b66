//! Thread-safe recorder for action start and completion events

use crate::{Error, Result};
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Significant figures kept by the histograms (0.1% precision)
const HISTOGRAM_SIGFIGS: u8 = 3;

/// Largest trackable value, one hour in microseconds; longer samples are clamped
const HISTOGRAM_MAX_US: u64 = 3_600_000_000;

fn new_histogram() -> Result<Histogram<u64>> {
    Histogram::new_with_max(HISTOGRAM_MAX_US, HISTOGRAM_SIGFIGS)
        .map_err(|e| Error::Stats(format!("Failed to create histogram: {e}")))
}

/// Percentile summary of a set of durations, in microseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub samples: u64,
    pub mean_us: f64,
    pub p50_us: u64,
    pub p90_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

impl DistributionSummary {
    fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.is_empty() {
            return Self::default();
        }
        Self {
            samples: hist.len(),
            mean_us: hist.mean(),
            p50_us: hist.value_at_quantile(0.50),
            p90_us: hist.value_at_quantile(0.90),
            p99_us: hist.value_at_quantile(0.99),
            max_us: hist.max(),
        }
    }
}

/// Outcome of one dispatch run as seen by its actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Actions handed to the tuning set
    pub actions: u64,
    /// Actions that began running
    pub started: u64,
    /// Actions that ran to completion
    pub completed: u64,
    /// Actions that started but never completed (panicked)
    pub faulted: u64,
    pub wall_time_secs: f64,
    /// Launches per second between the first and the last start
    pub achieved_rate: f64,
    /// Gaps between consecutive starts
    pub launch_gap: DistributionSummary,
    /// Time from start to completion of each completed action
    pub service_time: DistributionSummary,
}

struct RecorderState {
    starts: Vec<Duration>,
    completed: u64,
    service_time_us: Histogram<u64>,
}

/// Shared sink written by running actions
pub struct RunRecorder {
    origin: Instant,
    state: Mutex<RecorderState>,
}

impl RunRecorder {
    pub fn new() -> Result<Self> {
        let service_time_us = new_histogram()?;

        Ok(Self {
            origin: Instant::now(),
            state: Mutex::new(RecorderState { starts: Vec::new(), completed: 0, service_time_us }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Note that an action began running; returns its start instant
    pub fn record_start(&self) -> Instant {
        let now = Instant::now();
        self.lock().starts.push(now.saturating_duration_since(self.origin));
        now
    }

    /// Note that the action started at `started` has finished
    pub fn record_completion(&self, started: Instant) {
        let micros = started.elapsed().as_micros().min(u64::MAX as u128) as u64;
        let mut state = self.lock();
        state.completed += 1;
        state.service_time_us.saturating_record(micros);
    }

    pub fn started(&self) -> u64 {
        self.lock().starts.len() as u64
    }

    pub fn completed(&self) -> u64 {
        self.lock().completed
    }

    /// Summarize everything recorded so far
    ///
    /// # Parameters
    /// - `actions`: Number of actions handed to the tuning set
    /// - `wall_time`: Duration of the `execute` call
    pub fn summary(&self, actions: usize, wall_time: Duration) -> Result<RunSummary> {
        let state = self.lock();

        let mut starts = state.starts.clone();
        starts.sort_unstable();

        let mut gaps_us = new_histogram()?;
        for pair in starts.windows(2) {
            gaps_us.saturating_record((pair[1] - pair[0]).as_micros() as u64);
        }

        let achieved_rate = match (starts.first(), starts.last()) {
            (Some(first), Some(last)) if last > first => {
                (starts.len() - 1) as f64 / (*last - *first).as_secs_f64()
            }
            _ => 0.0,
        };

        let started = starts.len() as u64;
        Ok(RunSummary {
            actions: actions as u64,
            started,
            completed: state.completed,
            faulted: started.saturating_sub(state.completed),
            wall_time_secs: wall_time.as_secs_f64(),
            achieved_rate,
            launch_gap: DistributionSummary::from_histogram(&gaps_us),
            service_time: DistributionSummary::from_histogram(&state.service_time_us),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_summary() {
        let recorder = RunRecorder::new().unwrap();
        let summary = recorder.summary(0, Duration::ZERO).unwrap();

        assert_eq!(summary.started, 0);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.achieved_rate, 0.0);
        assert_eq!(summary.launch_gap, DistributionSummary::default());
    }

    #[test]
    fn test_counts_faults() {
        let recorder = RunRecorder::new().unwrap();
        let a = recorder.record_start();
        let _b = recorder.record_start();
        recorder.record_completion(a);

        let summary = recorder.summary(3, Duration::from_millis(5)).unwrap();
        assert_eq!(summary.actions, 3);
        assert_eq!(summary.started, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.faulted, 1);
        assert_eq!(summary.service_time.samples, 1);
    }

    #[test]
    fn test_service_time_and_rate() {
        let recorder = Arc::new(RunRecorder::new().unwrap());
        let mut handles = Vec::new();

        for i in 0..5 {
            let recorder = recorder.clone();
            thread::sleep(Duration::from_millis(10));
            handles.push(thread::spawn(move || {
                let started = recorder.record_start();
                thread::sleep(Duration::from_millis(20 + i));
                recorder.record_completion(started);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = recorder.summary(5, Duration::from_millis(80)).unwrap();
        assert_eq!(summary.completed, 5);
        assert_eq!(summary.faulted, 0);
        assert!(summary.service_time.p50_us >= 20_000);
        assert!(summary.service_time.max_us < 60_000, "{:?}", summary.service_time);
        assert_eq!(summary.launch_gap.samples, 4);
        assert!(summary.launch_gap.p50_us >= 8_000, "{:?}", summary.launch_gap);
        // Starts roughly 10ms apart
        assert!(summary.achieved_rate > 20.0 && summary.achieved_rate < 110.0);
        assert!((summary.wall_time_secs - 0.08).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_keeps_realistic_magnitudes() {
        let mut hist = new_histogram().unwrap();
        for us in [5_000, 5_000, 10_000, 250_000] {
            hist.saturating_record(us);
        }
        let summary = DistributionSummary::from_histogram(&hist);

        assert_eq!(summary.samples, 4);
        // 3 significant figures: within 0.1% of the recorded value
        assert!((4_995..=5_005).contains(&summary.p50_us), "{:?}", summary);
        assert!((249_750..=250_250).contains(&summary.max_us), "{:?}", summary);
    }

    #[test]
    fn test_histogram_clamps_beyond_one_hour() {
        let mut hist = new_histogram().unwrap();
        hist.saturating_record(u64::MAX);
        let max = DistributionSummary::from_histogram(&hist).max_us;
        assert!(max >= HISTOGRAM_MAX_US - HISTOGRAM_MAX_US / 1000, "{max}");
    }
}
