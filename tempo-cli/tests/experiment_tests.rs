//! Running small profiles end to end

use std::io::Write;
use tempfile::NamedTempFile;
use tempo_cli::config::ProfileConfig;
use tempo_cli::experiment::run_experiment;
use tempo_cli::output::RunReport;

fn profile(tuning_set: &str, extra: &str) -> ProfileConfig {
    let content = format!(
        r#"
[experiment]
name = "it"
seed = 1234
actions = 40
tuning_set = "{tuning_set}"

[[tuning_sets]]
name = "steady"
type = "poisson"
expected_actions_per_second = 400.0

[[tuning_sets]]
name = "fixed"
type = "qps"
qps = 100.0

[[tuning_sets]]
name = "capped"
type = "parallelism-limited"
parallelism_limit = 4

{extra}
"#
    );
    let config: ProfileConfig = toml::from_str(&content).expect("profile should parse");
    config.validate().expect("profile should be valid");
    config
}

#[test]
fn test_poisson_run_reports_every_action() {
    let config = profile("steady", "");
    let report = run_experiment(&config).unwrap();

    assert_eq!(report.experiment, "it");
    assert_eq!(report.tuning_set, "steady");
    assert_eq!(report.kind, "poisson");
    assert_eq!(report.seed, Some(1234));

    let s = &report.summary;
    assert_eq!(s.actions, 40);
    assert_eq!(s.started, 40);
    assert_eq!(s.completed, 40);
    assert_eq!(s.faulted, 0);
    assert_eq!(s.launch_gap.samples, 39);
    // Exponential gaps averaging 2.5ms
    assert!(
        s.launch_gap.mean_us > 1_000.0 && s.launch_gap.mean_us < 6_000.0,
        "{:?}",
        s.launch_gap
    );
    // 39 gaps at 400/s average ~97ms
    assert!(s.wall_time_secs > 0.03 && s.wall_time_secs < 1.0, "{}", s.wall_time_secs);
}

#[test]
fn test_reported_latencies_match_the_workload() {
    let config = profile(
        "fixed",
        r#"
[workload]
service_time = { type = "fixed", duration = "5ms" }
"#,
    );
    let report = run_experiment(&config).unwrap();
    let s = &report.summary;

    assert_eq!(s.completed, 40);

    // Each action sleeps 5ms
    assert_eq!(s.service_time.samples, 40);
    assert!(
        (5_000..8_000).contains(&s.service_time.p50_us),
        "service time {:?}",
        s.service_time
    );
    assert!(s.service_time.mean_us >= 5_000.0, "service time {:?}", s.service_time);

    // qps = 100 launches every 10ms
    assert_eq!(s.launch_gap.samples, 39);
    assert!(
        (9_000..11_000).contains(&s.launch_gap.p50_us),
        "launch gap {:?}",
        s.launch_gap
    );
    assert!(s.achieved_rate > 80.0 && s.achieved_rate < 120.0, "rate {}", s.achieved_rate);
}

#[test]
fn test_faults_are_counted_not_fatal() {
    let config = profile(
        "capped",
        r#"
[workload]
service_time = { type = "fixed", duration = "1ms" }
fault_probability = 1.0
"#,
    );
    let report = run_experiment(&config).unwrap();

    assert_eq!(report.kind, "parallelism-limited");
    assert_eq!(report.summary.started, 40);
    assert_eq!(report.summary.completed, 0);
    assert_eq!(report.summary.faulted, 40);
    assert_eq!(report.summary.service_time.samples, 0);
}

#[test]
fn test_zero_actions() {
    let mut config = profile("steady", "");
    config.experiment.actions = 0;

    let report = run_experiment(&config).unwrap();
    assert_eq!(report.summary.started, 0);
    assert_eq!(report.summary.achieved_rate, 0.0);
    assert!(report.summary.wall_time_secs < 0.1);
}

#[test]
fn test_report_written_as_json() {
    let config = profile("steady", "");
    let report = run_experiment(&config).unwrap();

    let mut out = NamedTempFile::new().unwrap();
    report.write_json(out.path()).unwrap();
    out.flush().unwrap();

    let content = std::fs::read_to_string(out.path()).unwrap();
    let back: RunReport = serde_json::from_str(&content).unwrap();
    assert_eq!(back.summary.completed, 40);
    assert_eq!(back.kind, "poisson");
}
