//! Results output formatting

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempo_core::stats::{DistributionSummary, RunSummary};

/// Report of one experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub experiment: String,
    pub tuning_set: String,
    /// Strategy type, as written in the profile
    pub kind: String,
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl RunReport {
    pub fn new(
        experiment: impl Into<String>,
        tuning_set: impl Into<String>,
        kind: impl Into<String>,
        seed: Option<u64>,
        summary: RunSummary,
    ) -> Self {
        Self {
            experiment: experiment.into(),
            tuning_set: tuning_set.into(),
            kind: kind.into(),
            seed,
            summary,
        }
    }

    /// Print results to stdout in human-readable format
    pub fn print_human(&self) {
        let s = &self.summary;

        println!("\n{}", "=".repeat(60));
        println!("Tempo Dispatch Results");
        println!("{}", "=".repeat(60));
        println!();
        println!("Configuration:");
        println!("  Experiment:      {}", self.experiment);
        println!("  Tuning set:      {} ({})", self.tuning_set, self.kind);
        match self.seed {
            Some(seed) => println!("  Seed:            {}", seed),
            None => println!("  Seed:            (entropy)"),
        }
        println!();
        println!("Actions:");
        println!("  Handed over:     {}", s.actions);
        println!("  Started:         {}", s.started);
        println!("  Completed:       {}", s.completed);
        println!("  Faulted:         {}", s.faulted);
        println!();
        println!("Timing:");
        println!("  Wall time:       {:.3}s", s.wall_time_secs);
        println!("  Launch rate:     {:.2} actions/s", s.achieved_rate);
        println!();
        print_distribution("Launch gap (microseconds):", &s.launch_gap);
        print_distribution("Service time (microseconds):", &s.service_time);
        println!("{}", "=".repeat(60));
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write results to JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

fn print_distribution(title: &str, d: &DistributionSummary) {
    println!("{title}");
    if d.samples == 0 {
        println!("  (no samples)");
        println!();
        return;
    }
    println!("  Samples:         {}", d.samples);
    println!("  Mean:            {:.2} μs", d.mean_us);
    println!("  p50:             {} μs", d.p50_us);
    println!("  p90:             {} μs", d.p90_us);
    println!("  p99:             {} μs", d.p99_us);
    println!("  Max:             {} μs", d.max_us);
    println!();
}
