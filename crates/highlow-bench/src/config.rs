use highlow_core::shuffle::ShuffleAlgorithm;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_SHUFFLES: usize = 10_000;
const DEFAULT_GAMES: usize = 500;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root harness configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BiasBenchConfig {
    pub run_id: String,
    pub trials: TrialConfig,
    pub algorithms: Vec<ShuffleAlgorithm>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BiasBenchConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BiasBenchConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.trials.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        validate_algorithms(&self.algorithms)?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            frequency_csv: resolve_template(&self.run_id, &self.outputs.frequency_csv),
            sessions_jsonl: resolve_template(&self.run_id, &self.outputs.sessions_jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

/// Trial volume configuration block. `games` may be zero to skip the
/// guessing-session pass and run frequency trials only.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrialConfig {
    pub seed: Option<u64>,
    #[serde(default = "default_shuffles")]
    pub shuffles: usize,
    #[serde(default = "default_games")]
    pub games: usize,
}

impl TrialConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.shuffles == 0 {
            return Err(ValidationError::InvalidField {
                field: "trials.shuffles".to_string(),
                message: "number of shuffles must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn default_shuffles() -> usize {
    DEFAULT_SHUFFLES
}

fn default_games() -> usize {
    DEFAULT_GAMES
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub frequency_csv: String,
    pub sessions_jsonl: String,
    pub summary_md: String,
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.frequency_csv", &self.frequency_csv),
            ("outputs.sessions_jsonl", &self.sessions_jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.plots_dir", &self.plots_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_algorithms(algorithms: &[ShuffleAlgorithm]) -> Result<(), ValidationError> {
    if algorithms.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "algorithms".to_string(),
            message: "at least one algorithm must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for algorithm in algorithms {
        if !seen.insert(*algorithm) {
            return Err(ValidationError::InvalidField {
                field: "algorithms".to_string(),
                message: format!("algorithm '{algorithm}' listed more than once"),
            });
        }
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub frequency_csv: PathBuf,
    pub sessions_jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "stage0_bias"
trials:
  seed: 123
  shuffles: 4000
algorithms:
  - "uniform"
  - "naive"
  - "smart"
outputs:
  frequency_csv: "bench/out/{run_id}/frequency.csv"
  sessions_jsonl: "bench/out/{run_id}/sessions.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
  plots_dir: "bench/out/{run_id}/plots"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BiasBenchConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.trials.shuffles, 4000);
        assert_eq!(cfg.trials.games, DEFAULT_GAMES);
        assert_eq!(cfg.algorithms.len(), 3);
        assert!(cfg.logging.enable_structured);

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.frequency_csv,
            PathBuf::from("bench/out/stage0_bias/frequency.csv")
        );
    }

    #[test]
    fn rejects_zero_shuffles() {
        let yaml = BASIC_YAML.replace("shuffles: 4000", "shuffles: 0");
        let mut cfg: BiasBenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("zero shuffles should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "trials.shuffles"
        ));
    }

    #[test]
    fn rejects_duplicate_algorithms() {
        let yaml = BASIC_YAML.replace("- \"smart\"", "- \"naive\"");
        let mut cfg: BiasBenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate algorithms should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "algorithms"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("stage0_bias", "stage 0 bias");
        let mut cfg: BiasBenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn rejects_unknown_algorithm_names_at_parse_time() {
        let yaml = BASIC_YAML.replace("- \"naive\"", "- \"riffle\"");
        assert!(serde_yaml::from_str::<BiasBenchConfig>(&yaml).is_err());
    }

    #[test]
    fn outputs_resolve_template_multiple_occurrences() {
        let yaml = BASIC_YAML.replace(
            "bench/out/{run_id}/plots",
            "bench/out/{run_id}/{run_id}/plots",
        );
        let mut cfg: BiasBenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.plots_dir,
            PathBuf::from("bench/out/stage0_bias/stage0_bias/plots")
        );
    }
}
