//! Profile configuration for tempo
//!
//! A profile is a TOML file describing one dispatch experiment: which tuning set
//! to use, how many synthetic actions to hand it, what those actions do, and
//! where the report goes. Any value can be overridden from the command line with
//! `--set key.path=value`.

use anyhow::{bail, Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempo_core::{NamedTuningSet, TuningSetRegistry};

/// Top-level profile configuration
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ProfileConfig {
    pub experiment: ExperimentConfig,
    /// Named dispatch strategies; `experiment.tuning_set` selects one
    pub tuning_sets: Vec<NamedTuningSet>,
    #[serde(default)]
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Experiment metadata
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ExperimentConfig {
    /// Experiment name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Random seed for reproducibility (None = use entropy)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of synthetic actions handed to the tuning set
    pub actions: usize,
    /// Name of the tuning set to run
    pub tuning_set: String,
}

/// What each synthetic action does
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct WorkloadConfig {
    /// Time each action spends "working"
    #[serde(default)]
    pub service_time: ServiceTimeConfig,
    /// Probability in [0, 1] that an action panics instead of completing
    #[serde(default)]
    pub fault_probability: f64,
}

/// Service-time distribution of the synthetic actions
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceTimeConfig {
    Fixed {
        #[serde(with = "humantime_serde")]
        #[schemars(with = "String")]
        duration: Duration,
    },
    Exponential {
        #[serde(with = "humantime_serde")]
        #[schemars(with = "String")]
        mean: Duration,
    },
    Uniform {
        #[serde(with = "humantime_serde")]
        #[schemars(with = "String")]
        min: Duration,
        #[serde(with = "humantime_serde")]
        #[schemars(with = "String")]
        max: Duration,
    },
    Lognormal {
        #[serde(with = "humantime_serde")]
        #[schemars(with = "String")]
        median: Duration,
        /// Standard deviation of the underlying normal
        sigma: f64,
    },
}

impl Default for ServiceTimeConfig {
    fn default() -> Self {
        Self::Fixed { duration: Duration::ZERO }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct OutputConfig {
    /// Output format: human, json
    #[serde(default = "default_format")]
    pub format: String,
    /// Write the JSON report to this file as well
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_format() -> String {
    "human".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: default_format(), file: None }
    }
}

impl ProfileConfig {
    /// Load profile from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load profile from TOML file, apply `--set` style overrides, and validate
    pub fn from_file_with_overrides<P: AsRef<Path>>(path: P, overrides: &[String]) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut value: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        for override_str in overrides {
            let (key, val) = parse_key_value(override_str)
                .with_context(|| format!("Invalid override format: {}", override_str))?;

            set_toml_path(&mut value, &key, &val)
                .with_context(|| format!("Failed to apply override: {}", override_str))?;
        }

        let config: ProfileConfig =
            value.try_into().context("Failed to deserialize modified configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.experiment.name.is_empty() {
            bail!("Experiment name cannot be empty");
        }

        if self.tuning_sets.is_empty() {
            bail!("At least one tuning set must be defined");
        }
        let registry = self.registry()?;
        if registry.config(&self.experiment.tuning_set).is_none() {
            bail!(
                "Experiment tuning_set '{}' is not defined. Defined: {}",
                self.experiment.tuning_set,
                registry.names().collect::<Vec<_>>().join(", ")
            );
        }

        self.validate_workload()?;

        let valid_formats = ["human", "json"];
        if !valid_formats.contains(&self.output.format.as_str()) {
            bail!(
                "Invalid output format '{}'. Valid options: {}",
                self.output.format,
                valid_formats.join(", ")
            );
        }

        Ok(())
    }

    fn validate_workload(&self) -> Result<()> {
        let p = self.workload.fault_probability;
        if !(0.0..=1.0).contains(&p) {
            bail!("fault_probability must be within [0, 1], got {}", p);
        }

        match &self.workload.service_time {
            ServiceTimeConfig::Fixed { .. } => {}
            ServiceTimeConfig::Exponential { mean } => {
                if mean.is_zero() {
                    bail!("Exponential service time mean must be > 0");
                }
            }
            ServiceTimeConfig::Uniform { min, max } => {
                if min >= max {
                    bail!("Uniform service time min must be < max");
                }
            }
            ServiceTimeConfig::Lognormal { median, sigma } => {
                if median.is_zero() {
                    bail!("Lognormal service time median must be > 0");
                }
                if !(sigma.is_finite() && *sigma > 0.0) {
                    bail!("Lognormal service time sigma must be > 0");
                }
            }
        }
        Ok(())
    }

    /// Registry of every configured tuning set, seeded from `experiment.seed`
    pub fn registry(&self) -> Result<TuningSetRegistry> {
        Ok(TuningSetRegistry::from_configs(&self.tuning_sets, self.experiment.seed)?)
    }
}

/// Parse a "key=value" string into (key, value) tuple
fn parse_key_value(override_str: &str) -> Result<(String, String)> {
    match override_str.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => bail!("Invalid override format '{}'. Expected 'key=value'", override_str),
    }
}

/// Path segment types
enum PathSegment {
    Key(String),
    Index(usize),
    Append,
}

/// Parse a path string into segments (handles "key", "0", "+")
fn parse_path(path: &str) -> Vec<PathSegment> {
    path.split('.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part == "+" {
                PathSegment::Append
            } else if let Ok(idx) = part.parse::<usize>() {
                PathSegment::Index(idx)
            } else {
                PathSegment::Key(part.to_string())
            }
        })
        .collect()
}

/// Set a value in TOML using dot-notation path
///
/// Missing intermediate tables are created. `tuning_sets.0.x` indexes into an
/// array and `tuning_sets.+` appends to one.
fn set_toml_path(root: &mut toml::Value, path: &str, value_str: &str) -> Result<()> {
    let parts = parse_path(path);
    let Some((last, parents)) = parts.split_last() else {
        bail!("Empty path");
    };

    let mut current = root;
    for part in parents {
        current = match part {
            PathSegment::Key(key) => {
                let toml::Value::Table(table) = current else {
                    bail!("Cannot navigate through non-table value at key '{}'", key);
                };
                table.entry(key.clone()).or_insert(toml::Value::Table(Default::default()))
            }
            PathSegment::Index(idx) => {
                let toml::Value::Array(arr) = current else {
                    bail!("Cannot index non-array value");
                };
                let len = arr.len();
                arr.get_mut(*idx).with_context(|| {
                    format!("Array index {} out of bounds (length: {})", idx, len)
                })?
            }
            PathSegment::Append => bail!("Append operation '+' can only be at the end of path"),
        };
    }

    let parsed_value = parse_value(value_str)?;
    match (last, current) {
        (PathSegment::Key(key), toml::Value::Table(table)) => {
            table.insert(key.clone(), parsed_value);
        }
        (PathSegment::Key(key), _) => bail!("Cannot set key '{}' on non-table value", key),
        (PathSegment::Index(idx), toml::Value::Array(arr)) => {
            let len = arr.len();
            let slot = arr.get_mut(*idx).with_context(|| {
                format!("Array index {} out of bounds (length: {})", idx, len)
            })?;
            *slot = parsed_value;
        }
        (PathSegment::Index(_), _) => bail!("Cannot index non-array value"),
        (PathSegment::Append, toml::Value::Array(arr)) => arr.push(parsed_value),
        (PathSegment::Append, _) => bail!("Cannot append to non-array value"),
    }

    Ok(())
}

/// Parse a string value with type inference
fn parse_value(value_str: &str) -> Result<toml::Value> {
    let trimmed = value_str.trim();

    match trimmed {
        "true" => return Ok(toml::Value::Boolean(true)),
        "false" => return Ok(toml::Value::Boolean(false)),
        _ => {}
    }

    if let Ok(int_val) = trimmed.parse::<i64>() {
        return Ok(toml::Value::Integer(int_val));
    }
    if let Ok(float_val) = trimmed.parse::<f64>() {
        return Ok(toml::Value::Float(float_val));
    }

    // Arrays and inline tables go through the TOML parser
    let is_array = trimmed.starts_with('[') && trimmed.ends_with(']');
    let is_table = trimmed.starts_with('{') && trimmed.ends_with('}');
    if is_array || is_table {
        let wrapped = format!("value = {}", trimmed);
        let mut table: toml::Table = toml::from_str(&wrapped)
            .with_context(|| format!("Failed to parse value: {}", trimmed))?;
        if let Some(value) = table.remove("value") {
            return Ok(value);
        }
        bail!("Failed to parse value: {}", trimmed);
    }

    let unquoted = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    Ok(toml::Value::String(unquoted.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> toml::Value {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true").unwrap(), toml::Value::Boolean(true));
        assert_eq!(parse_value("42").unwrap(), toml::Value::Integer(42));
        assert_eq!(parse_value("2.5").unwrap(), toml::Value::Float(2.5));
        assert_eq!(parse_value("5ms").unwrap(), toml::Value::String("5ms".into()));
        assert_eq!(parse_value("'json'").unwrap(), toml::Value::String("json".into()));
        assert_eq!(parse_value("\"").unwrap(), toml::Value::String("\"".into()));

        let arr = parse_value("[1, 2]").unwrap();
        assert_eq!(arr.as_array().map(Vec::len), Some(2));

        let inline = parse_value("{ type = \"fixed\", duration = \"1ms\" }").unwrap();
        assert_eq!(inline.get("type").and_then(|v| v.as_str()), Some("fixed"));

        assert!(parse_value("[1, }]").is_err());
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("experiment.seed=7").unwrap(),
            ("experiment.seed".to_string(), "7".to_string())
        );
        assert_eq!(parse_key_value("a=b=c").unwrap().1, "b=c");
        assert!(parse_key_value("no-equals").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_set_nested_key_creates_tables() {
        let mut root = table("[experiment]\nname = \"x\"\n");
        set_toml_path(&mut root, "output.file", "out.json").unwrap();
        assert_eq!(root["output"]["file"].as_str(), Some("out.json"));
    }

    #[test]
    fn test_set_array_index_and_append() {
        let mut root = table("[[tuning_sets]]\nname = \"a\"\ntype = \"qps\"\nqps = 1.0\n");

        set_toml_path(&mut root, "tuning_sets.0.qps", "25").unwrap();
        assert_eq!(root["tuning_sets"][0]["qps"].as_integer(), Some(25));

        set_toml_path(&mut root, "tuning_sets.+", "{ name = \"b\", type = \"poisson\" }").unwrap();
        assert_eq!(root["tuning_sets"][1]["name"].as_str(), Some("b"));

        assert!(set_toml_path(&mut root, "tuning_sets.5.qps", "1").is_err());
        assert!(set_toml_path(&mut root, "tuning_sets.+.name", "c").is_err());
        assert!(set_toml_path(&mut root, "", "1").is_err());
    }

    #[test]
    fn test_set_key_on_scalar_fails() {
        let mut root = table("name = \"x\"\n");
        assert!(set_toml_path(&mut root, "name.inner", "1").is_err());
    }

    #[test]
    fn test_service_time_default_is_zero() {
        assert_eq!(
            ServiceTimeConfig::default(),
            ServiceTimeConfig::Fixed { duration: Duration::ZERO }
        );
        assert_eq!(OutputConfig::default().format, "human");
    }
}
