use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use schemars::schema_for;
use std::io;
use std::path::PathBuf;
use tempo_cli::config::ProfileConfig;
use tempo_cli::experiment::run_experiment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tempo: pluggable load-generation scheduler
///
/// Tempo uses TOML configuration files (profiles) to define experiments. A
/// profile names a set of dispatch strategies, picks one, and describes the
/// synthetic actions it launches.
///
/// Example usage:
///   tempo run -P profiles/poisson-smoke.toml
///   tempo run -P profiles/poisson-smoke.toml --set experiment.seed=12345
///   tempo run -P profiles/strategies.toml --set experiment.tuning_set=burst
///   tempo completions bash > ~/.local/share/bash-completion/completions/tempo
///
/// Override any config value using dot notation:
///   --set tuning_sets.0.expected_actions_per_second=500
///   --set 'workload.service_time={type="exponential",mean="2ms"}'
///   --set 'tuning_sets.+={name="fast",type="qps",qps=1000.0}'
#[derive(Parser)]
#[command(name = "tempo")]
#[command(version, about = "Load-generation scheduler with pluggable dispatch strategies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a dispatch experiment
    Run {
        /// Path to TOML profile configuration file (REQUIRED)
        #[arg(short = 'P', long, required = true)]
        profile: PathBuf,

        /// Override any configuration value using dot notation (can be specified multiple times)
        ///
        /// Examples:
        ///   --set experiment.actions=1000
        ///   --set experiment.seed=999
        ///   --set tuning_sets.0.expected_actions_per_second=50
        ///   --set workload.fault_probability=0.01
        ///   --set output.format=json
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for configuration files
    Schema,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "tempo", &mut io::stdout());
            Ok(())
        }
        Commands::Schema => {
            let schema = schema_for!(ProfileConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Commands::Run { profile, set } => run(profile, set),
    }
}

fn run(profile: PathBuf, set: Vec<String>) -> anyhow::Result<()> {
    tracing::info!("Loading profile: {}", profile.display());

    let config = if set.is_empty() {
        let config = ProfileConfig::from_file(&profile)?;
        config.validate()?;
        config
    } else {
        ProfileConfig::from_file_with_overrides(&profile, &set)?
    };

    tracing::info!("=== Experiment Configuration ===");
    tracing::info!("Name: {}", config.experiment.name);
    if let Some(desc) = &config.experiment.description {
        tracing::info!("Description: {}", desc);
    }
    match config.experiment.seed {
        Some(seed) => tracing::info!("Seed: {} (reproducible mode)", seed),
        None => tracing::info!("Seed: none (entropy)"),
    }
    tracing::info!("Actions: {}", config.experiment.actions);
    tracing::info!("Tuning set: {}", config.experiment.tuning_set);
    tracing::info!("Service time: {:?}", config.workload.service_time);
    tracing::info!("================================");

    let report = run_experiment(&config)?;

    match config.output.format.as_str() {
        "json" if config.output.file.is_none() => println!("{}", report.to_json()?),
        "json" => {}
        _ => report.print_human(),
    }

    if let Some(path) = &config.output.file {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        tracing::info!("Results written to: {}", path.display());
    }

    Ok(())
}
