//! Running a profile end to end

use crate::config::ProfileConfig;
use crate::output::RunReport;
use crate::workload::build_actions;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tempo_core::stats::RunRecorder;

/// Build the profile's tuning set and synthetic actions, run them, and summarize
///
/// A launch failure aborts the experiment after the already-launched actions
/// have drained. Faulting actions only show up in the report.
pub fn run_experiment(config: &ProfileConfig) -> Result<RunReport> {
    let experiment = &config.experiment;
    let registry = config.registry()?;
    let kind = registry
        .config(&experiment.tuning_set)
        .map(|c| c.kind())
        .with_context(|| format!("Unknown tuning set '{}'", experiment.tuning_set))?;
    let mut tuning_set = registry.get(&experiment.tuning_set)?;

    let recorder = Arc::new(RunRecorder::new()?);
    let actions = build_actions(experiment.actions, &config.workload, experiment.seed, &recorder)?;

    tracing::info!(
        tuning_set = %experiment.tuning_set,
        kind,
        actions = experiment.actions,
        "Starting dispatch"
    );

    let start = Instant::now();
    tuning_set
        .execute(actions)
        .with_context(|| format!("Tuning set '{}' failed", experiment.tuning_set))?;
    let wall_time = start.elapsed();

    let summary = recorder.summary(experiment.actions, wall_time)?;
    tracing::info!(
        completed = summary.completed,
        faulted = summary.faulted,
        wall_time = ?wall_time,
        "Dispatch finished"
    );

    Ok(RunReport::new(&experiment.name, &experiment.tuning_set, kind, experiment.seed, summary))
}
