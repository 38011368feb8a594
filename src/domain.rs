//! Table shapes read and written by the exposure pipeline.
//!
//! Input records keep their raw categorical fields as strings; the score
//! mapper is the only place those strings are interpreted. Numeric inputs
//! coming from published labor tables are read leniently: suppressed cells
//! (`"*"`, `"#"`, `"**"`) and non-finite values deserialize as missing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::constants::{self, SOC_CODE_LEN};

/// `XX-XXXX` or `XX-XXXX.XX`
static OCCUPATION_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{4}(\.\d{2})?$").expect("occupation code pattern"));

/// Returns true when `code` is a SOC code or an O*NET-SOC code
pub fn is_valid_occupation_code(code: &str) -> bool {
    OCCUPATION_CODE.is_match(code.trim())
}

/// Derive the 7-character SOC code used to join against labor tables.
///
/// `11-1011.03` and `11-1011` both yield `11-1011`. Codes shorter than seven
/// characters have no SOC prefix and yield `None`.
pub fn derive_soc_code(code: &str) -> Option<String> {
    code.trim().get(..SOC_CODE_LEN).map(|s| s.to_string())
}

/// O*NET task classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Core,
    Supplemental,
}

impl TaskType {
    /// Parse an O*NET task type; anything other than core/supplemental is unknown
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "core" => Some(TaskType::Core),
            "supplemental" => Some(TaskType::Supplemental),
            _ => None,
        }
    }
}

/// A rated O*NET task, one row of the task catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    /// O*NET-SOC code of the occupation the task belongs to (e.g. `15-1252.00`)
    #[serde(alias = "O*NET-SOC Code")]
    pub onet_soc_code: String,
    /// O*NET task identifier
    #[serde(alias = "Task ID", deserialize_with = "string_or_number")]
    pub task_id: String,
    /// Occupation title
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    /// Task statement
    #[serde(default, alias = "Task")]
    pub task: Option<String>,
    /// `Core`, `Supplemental`, or anything else (treated as unknown)
    #[serde(default, alias = "Task Type")]
    pub task_type: Option<String>,
    /// O*NET importance rating
    #[serde(default, alias = "Importance", deserialize_with = "lenient_number")]
    pub importance: Option<f64>,
    /// O*NET relevance rating
    #[serde(default, alias = "Relevance", deserialize_with = "lenient_number")]
    pub relevance: Option<f64>,
    /// Exposure label assigned by the automated rater (`E0`..`E3`)
    #[serde(default)]
    pub automated_label: Option<String>,
    /// Exposure label assigned by human raters (`E0`..`E3`)
    #[serde(default)]
    pub human_label: Option<String>,
    /// Automation label (`T0`..`T4`)
    #[serde(default)]
    pub automation_label: Option<String>,
}

impl TaskRecord {
    pub fn task_type(&self) -> Option<TaskType> {
        self.task_type.as_deref().and_then(TaskType::parse)
    }
}

/// One employment/wage row of an external labor table (e.g. OEWS national estimates)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaborRecord {
    #[serde(alias = "OCC_CODE", alias = "occ_code")]
    pub soc_code: String,
    #[serde(default, alias = "TOT_EMP", deserialize_with = "lenient_number")]
    pub employment: Option<f64>,
    #[serde(default, alias = "A_MEAN", deserialize_with = "lenient_number")]
    pub mean_annual_wage: Option<f64>,
    #[serde(default, alias = "A_MEDIAN", deserialize_with = "lenient_number")]
    pub median_annual_wage: Option<f64>,
    #[serde(default, alias = "H_MEAN", deserialize_with = "lenient_number")]
    pub mean_hourly_wage: Option<f64>,
    #[serde(default, alias = "H_MEDIAN", deserialize_with = "lenient_number")]
    pub median_hourly_wage: Option<f64>,
}

/// Employment of one occupation within one NAICS industry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustryEmploymentRecord {
    #[serde(alias = "NAICS", deserialize_with = "string_or_number")]
    pub naics_code: String,
    #[serde(default, alias = "NAICS_TITLE")]
    pub naics_title: Option<String>,
    #[serde(alias = "OCC_CODE", alias = "occ_code")]
    pub soc_code: String,
    #[serde(default, alias = "TOT_EMP", deserialize_with = "lenient_number")]
    pub employment: Option<f64>,
}

/// The seven aggregated exposure columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureColumn {
    AutomatedAlpha,
    AutomatedBeta,
    AutomatedGamma,
    HumanAlpha,
    HumanBeta,
    HumanGamma,
    Automation,
}

impl ExposureColumn {
    pub const COUNT: usize = 7;

    pub const ALL: [ExposureColumn; Self::COUNT] = [
        ExposureColumn::AutomatedAlpha,
        ExposureColumn::AutomatedBeta,
        ExposureColumn::AutomatedGamma,
        ExposureColumn::HumanAlpha,
        ExposureColumn::HumanBeta,
        ExposureColumn::HumanGamma,
        ExposureColumn::Automation,
    ];

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        match self {
            ExposureColumn::AutomatedAlpha => 0,
            ExposureColumn::AutomatedBeta => 1,
            ExposureColumn::AutomatedGamma => 2,
            ExposureColumn::HumanAlpha => 3,
            ExposureColumn::HumanBeta => 4,
            ExposureColumn::HumanGamma => 5,
            ExposureColumn::Automation => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExposureColumn::AutomatedAlpha => constants::AUTOMATED_ALPHA,
            ExposureColumn::AutomatedBeta => constants::AUTOMATED_BETA,
            ExposureColumn::AutomatedGamma => constants::AUTOMATED_GAMMA,
            ExposureColumn::HumanAlpha => constants::HUMAN_ALPHA,
            ExposureColumn::HumanBeta => constants::HUMAN_BETA,
            ExposureColumn::HumanGamma => constants::HUMAN_GAMMA,
            ExposureColumn::Automation => constants::AUTOMATION,
        }
    }
}

impl fmt::Display for ExposureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per exposure column. `None` means the column had no
/// contributing weight for this row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureScores {
    pub automated_alpha: Option<f64>,
    pub automated_beta: Option<f64>,
    pub automated_gamma: Option<f64>,
    pub human_alpha: Option<f64>,
    pub human_beta: Option<f64>,
    pub human_gamma: Option<f64>,
    pub automation: Option<f64>,
}

impl ExposureScores {
    /// Build a row by evaluating `f` once per column
    pub fn from_fn(mut f: impl FnMut(ExposureColumn) -> Option<f64>) -> Self {
        let mut scores = Self::default();
        for column in ExposureColumn::ALL {
            scores.set(column, f(column));
        }
        scores
    }

    pub fn get(&self, column: ExposureColumn) -> Option<f64> {
        match column {
            ExposureColumn::AutomatedAlpha => self.automated_alpha,
            ExposureColumn::AutomatedBeta => self.automated_beta,
            ExposureColumn::AutomatedGamma => self.automated_gamma,
            ExposureColumn::HumanAlpha => self.human_alpha,
            ExposureColumn::HumanBeta => self.human_beta,
            ExposureColumn::HumanGamma => self.human_gamma,
            ExposureColumn::Automation => self.automation,
        }
    }

    pub fn set(&mut self, column: ExposureColumn, value: Option<f64>) {
        let slot = match column {
            ExposureColumn::AutomatedAlpha => &mut self.automated_alpha,
            ExposureColumn::AutomatedBeta => &mut self.automated_beta,
            ExposureColumn::AutomatedGamma => &mut self.automated_gamma,
            ExposureColumn::HumanAlpha => &mut self.human_alpha,
            ExposureColumn::HumanBeta => &mut self.human_beta,
            ExposureColumn::HumanGamma => &mut self.human_gamma,
            ExposureColumn::Automation => &mut self.automation,
        };
        *slot = value;
    }
}

/// Occupation-level exposure, derived once per run from the task catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationRecord {
    /// Grouping key: the O*NET-SOC code, or the SOC code when grouping by SOC
    pub occupation_code: String,
    /// First seven characters of the occupation code
    pub soc_code: String,
    pub title: Option<String>,
    #[serde(flatten)]
    pub scores: ExposureScores,
    /// Tasks that carried a usable weight under the chosen scheme
    pub task_count: usize,
    /// Total weight of those tasks
    pub weight_sum: f64,
}

/// An occupation row left-joined with its labor-market row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    #[serde(flatten)]
    pub occupation: OccupationRecord,
    /// Whether a labor row was found for `soc_code`
    pub labor_matched: bool,
    pub employment: Option<f64>,
    pub mean_annual_wage: Option<f64>,
    pub median_annual_wage: Option<f64>,
    pub mean_hourly_wage: Option<f64>,
    pub median_hourly_wage: Option<f64>,
    pub log_employment: Option<f64>,
    pub log_mean_annual_wage: Option<f64>,
    pub log_median_annual_wage: Option<f64>,
}

/// Employment-weighted exposure of one NAICS industry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRecord {
    pub naics_code: String,
    pub naics_title: Option<String>,
    #[serde(flatten)]
    pub scores: ExposureScores,
    /// Occupations with both employment and exposure in this industry
    pub occupation_count: usize,
    /// Employment across those occupations
    pub employment: f64,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derive_soc_code() {
        assert_eq!(derive_soc_code("11-1011.03").as_deref(), Some("11-1011"));
        assert_eq!(derive_soc_code("11-1011").as_deref(), Some("11-1011"));
        assert_eq!(derive_soc_code(" 11-1011.00 ").as_deref(), Some("11-1011"));
        assert_eq!(derive_soc_code("11-10"), None);
    }

    #[test]
    fn test_occupation_code_validation() {
        assert!(is_valid_occupation_code("15-1252.00"));
        assert!(is_valid_occupation_code("15-1252"));
        assert!(!is_valid_occupation_code("151252"));
        assert!(!is_valid_occupation_code("15-1252.0"));
        assert!(!is_valid_occupation_code(""));
    }

    #[test]
    fn test_task_record_accepts_onet_headers_and_numeric_ids() {
        let task: TaskRecord = serde_json::from_value(json!({
            "O*NET-SOC Code": "15-1252.00",
            "Task ID": 16363,
            "Task Type": "Core",
            "Importance": "4.12",
            "automated_label": "E1"
        }))
        .unwrap();

        assert_eq!(task.task_id, "16363");
        assert_eq!(task.task_type(), Some(TaskType::Core));
        assert_eq!(task.importance, Some(4.12));
        assert_eq!(task.relevance, None);
        assert_eq!(task.human_label, None);
    }

    #[test]
    fn test_labor_record_suppressed_cells_are_missing() {
        let row: LaborRecord = serde_json::from_value(json!({
            "OCC_CODE": "11-1011",
            "TOT_EMP": "211,230",
            "A_MEAN": "*",
            "A_MEDIAN": "#",
            "H_MEAN": 98.1,
            "H_MEDIAN": null
        }))
        .unwrap();

        assert_eq!(row.employment, Some(211230.0));
        assert_eq!(row.mean_annual_wage, None);
        assert_eq!(row.median_annual_wage, None);
        assert_eq!(row.mean_hourly_wage, Some(98.1));
        assert_eq!(row.median_hourly_wage, None);
    }

    #[test]
    fn test_unknown_task_type() {
        assert_eq!(TaskType::parse(" supplemental "), Some(TaskType::Supplemental));
        assert_eq!(TaskType::parse("n/a"), None);
    }

    #[test]
    fn test_scores_get_set_cover_every_column() {
        let scores = ExposureScores::from_fn(|c| Some(c.index() as f64));
        for (i, column) in ExposureColumn::ALL.iter().enumerate() {
            assert_eq!(column.index(), i);
            assert_eq!(scores.get(*column), Some(i as f64));
        }
    }

    #[test]
    fn test_occupation_record_serializes_flat_columns() {
        let record = OccupationRecord {
            occupation_code: "11-1011.00".to_string(),
            soc_code: "11-1011".to_string(),
            title: Some("Chief Executives".to_string()),
            scores: ExposureScores {
                automated_beta: Some(0.75),
                ..Default::default()
            },
            task_count: 2,
            weight_sum: 2.0,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["automated_beta"], json!(0.75));
        assert_eq!(value["human_alpha"], Value::Null);
        assert_eq!(value["soc_code"], json!("11-1011"));
    }
}
