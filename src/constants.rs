/// Output column names shared by the occupation, industry and summary tables.
/// Downstream analysis scripts select columns by these exact names.

// Automated-rater exposure columns
pub const AUTOMATED_ALPHA: &str = "automated_alpha";
pub const AUTOMATED_BETA: &str = "automated_beta";
pub const AUTOMATED_GAMMA: &str = "automated_gamma";

// Human-rater exposure columns
pub const HUMAN_ALPHA: &str = "human_alpha";
pub const HUMAN_BETA: &str = "human_beta";
pub const HUMAN_GAMMA: &str = "human_gamma";

// Automation column (five-level ordinal label)
pub const AUTOMATION: &str = "automation";

/// Length of a SOC code (`XX-XXXX`), the prefix of an O*NET-SOC code (`XX-XXXX.XX`)
pub const SOC_CODE_LEN: usize = 7;

// Task type weights for the `core` scheme
pub const CORE_TASK_WEIGHT: f64 = 2.0;
pub const SUPPLEMENTAL_TASK_WEIGHT: f64 = 1.0;
pub const UNKNOWN_TASK_TYPE_WEIGHT: f64 = 1.0;

pub const DEFAULT_CONFIG_PATH: &str = "exposure.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_TASKS_PATH: &str = "data/tasks.ndjson";

// Output artifact names (extension is chosen by the output format)
pub const OCCUPATIONS_TABLE: &str = "occupations";
pub const INDUSTRIES_TABLE: &str = "industries";
pub const SUMMARY_DOCUMENT: &str = "summary";
pub const MANIFEST_DOCUMENT: &str = "manifest";
pub const METRICS_FILE: &str = "metrics.prom";

/// Exposure thresholds reported by the summary when none are configured
pub const DEFAULT_SUMMARY_THRESHOLDS: [f64; 2] = [0.1, 0.5];
