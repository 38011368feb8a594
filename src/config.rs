use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants;
use crate::error::{ExposureError, Result};
use crate::pipeline::processing::aggregate::OccupationGrouping;
use crate::pipeline::processing::score_mapper::MissingPolicy;
use crate::pipeline::processing::weighting::WeightScheme;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub inputs: InputConfig,
    pub scoring: ScoringConfig,
    pub aggregation: AggregationConfig,
    pub output: OutputConfig,
    pub summary: SummaryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Rated task catalog (`.json` array or `.ndjson`)
    pub tasks: PathBuf,
    /// Occupation employment and wage table
    pub labor: Option<PathBuf>,
    /// Industry by occupation employment table
    pub industry: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tasks: PathBuf::from(constants::DEFAULT_TASKS_PATH),
            labor: None,
            industry: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Fail on unrecognized labels and malformed occupation codes instead of
    /// treating them as missing
    pub strict_labels: bool,
    /// Policy for tasks without an exposure label
    pub missing_exposure: MissingPolicy,
    /// Policy for tasks without an automation label
    pub missing_automation: MissingPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strict_labels: false,
            missing_exposure: MissingPolicy::ZeroFill,
            missing_automation: MissingPolicy::Exclude,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub weights: WeightScheme,
    pub grouping: OccupationGrouping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Ndjson,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub format: OutputFormat,
    /// Write a Prometheus text dump of run metrics next to the tables
    pub prometheus: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            format: OutputFormat::Ndjson,
            prometheus: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Exposure levels at which occupation and employment shares are reported
    pub thresholds: Vec<f64>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            thresholds: constants::DEFAULT_SUMMARY_THRESHOLDS.to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExposureError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `EXPOSURE_*` environment overrides. Call after `dotenv` has run.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("EXPOSURE_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }
        if let Ok(strict) = std::env::var("EXPOSURE_STRICT_LABELS") {
            self.scoring.strict_labels = parse_bool(&strict).ok_or_else(|| {
                ExposureError::Config(format!("EXPOSURE_STRICT_LABELS must be a boolean, got '{}'", strict))
            })?;
        }
        if let Ok(weights) = std::env::var("EXPOSURE_WEIGHTS") {
            self.aggregation.weights = weights.parse().map_err(ExposureError::Config)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self
            .summary
            .thresholds
            .iter()
            .find(|t| !t.is_finite() || **t < 0.0 || **t > 1.0)
        {
            return Err(ExposureError::Config(format!(
                "summary threshold {} is outside [0, 1]",
                bad
            )));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scoring.missing_exposure, MissingPolicy::ZeroFill);
        assert_eq!(config.scoring.missing_automation, MissingPolicy::Exclude);
        assert_eq!(config.aggregation.weights, WeightScheme::Equal);
        assert_eq!(config.aggregation.grouping, OccupationGrouping::Onet);
        assert_eq!(config.summary.thresholds, vec![0.1, 0.5]);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            [inputs]
            tasks = "data/full_labelset.ndjson"
            labor = "data/oews_national.json"
            industry = "data/oews_industry.ndjson"

            [scoring]
            strict_labels = true
            missing_exposure = "exclude"

            [aggregation]
            weights = "importance"
            grouping = "soc"

            [output]
            dir = "out"
            format = "json"
            prometheus = true

            [summary]
            thresholds = [0.25]
            "#,
        )
        .unwrap();

        assert_eq!(config.inputs.labor, Some(PathBuf::from("data/oews_national.json")));
        assert!(config.scoring.strict_labels);
        assert_eq!(config.scoring.missing_exposure, MissingPolicy::Exclude);
        assert_eq!(config.aggregation.weights, WeightScheme::Importance);
        assert_eq!(config.aggregation.grouping, OccupationGrouping::Soc);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.summary.thresholds, vec![0.25]);
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let err = Config::from_toml_str("[summary]\nthresholds = [1.5]").unwrap_err();
        assert!(matches!(err, ExposureError::Config(_)));
    }

    #[test]
    fn test_unknown_weight_scheme_is_rejected() {
        let err = Config::from_toml_str("[aggregation]\nweights = \"salience\"").unwrap_err();
        assert!(matches!(err, ExposureError::Toml(_)));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("EXPOSURE_WEIGHTS", "Relevance");
        std::env::set_var("EXPOSURE_STRICT_LABELS", "yes");
        std::env::set_var("EXPOSURE_OUTPUT_DIR", "env_out");
        let mut config = Config::default();
        let applied = config.apply_env_overrides();

        std::env::set_var("EXPOSURE_STRICT_LABELS", "sometimes");
        let bad_bool = Config::default().apply_env_overrides();

        std::env::set_var("EXPOSURE_STRICT_LABELS", "false");
        std::env::set_var("EXPOSURE_WEIGHTS", "salience");
        let bad_weights = Config::default().apply_env_overrides();

        std::env::remove_var("EXPOSURE_WEIGHTS");
        std::env::remove_var("EXPOSURE_STRICT_LABELS");
        std::env::remove_var("EXPOSURE_OUTPUT_DIR");

        applied.unwrap();
        assert_eq!(config.aggregation.weights, WeightScheme::Relevance);
        assert!(config.scoring.strict_labels);
        assert_eq!(config.output.dir, PathBuf::from("env_out"));
        assert!(matches!(bad_bool, Err(ExposureError::Config(_))));
        assert!(matches!(bad_weights, Err(ExposureError::Config(_))));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
