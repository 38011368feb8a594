use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ScoringConfig;
use crate::domain::{derive_soc_code, is_valid_occupation_code, ExposureColumn, TaskRecord, TaskType};
use crate::error::{ExposureError, Result};
use crate::pipeline::processing::labels::{AutomationLabel, ExposureLabel, ExposureScheme, ParsedLabel};

/// What a missing (or leniently ignored) label contributes to aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Count the task with a score of 0.0 (undefined exposure is no exposure)
    #[default]
    ZeroFill,
    /// Leave the task out of that column's weighted mean
    Exclude,
}

/// Who assigned an exposure label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSource {
    Automated,
    Human,
}

impl RatingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingSource::Automated => "automated",
            RatingSource::Human => "human",
        }
    }
}

/// Alpha/beta/gamma scores of one label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchemeScores {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl SchemeScores {
    pub const ZERO: SchemeScores = SchemeScores {
        alpha: 0.0,
        beta: 0.0,
        gamma: 0.0,
    };

    pub fn from_label(label: ExposureLabel) -> Self {
        Self {
            alpha: label.score(ExposureScheme::Alpha),
            beta: label.score(ExposureScheme::Beta),
            gamma: label.score(ExposureScheme::Gamma),
        }
    }
}

/// A task with its labels converted to numeric scores.
///
/// `None` in a score slot means the task does not contribute to that column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTask {
    pub occupation_code: String,
    pub soc_code: String,
    pub task_id: String,
    pub title: Option<String>,
    pub task_type: Option<TaskType>,
    pub importance: Option<f64>,
    pub relevance: Option<f64>,
    pub automated: Option<SchemeScores>,
    pub human: Option<SchemeScores>,
    pub automation: Option<f64>,
}

impl ScoredTask {
    pub fn column(&self, column: ExposureColumn) -> Option<f64> {
        match column {
            ExposureColumn::AutomatedAlpha => self.automated.map(|s| s.alpha),
            ExposureColumn::AutomatedBeta => self.automated.map(|s| s.beta),
            ExposureColumn::AutomatedGamma => self.automated.map(|s| s.gamma),
            ExposureColumn::HumanAlpha => self.human.map(|s| s.alpha),
            ExposureColumn::HumanBeta => self.human.map(|s| s.beta),
            ExposureColumn::HumanGamma => self.human.map(|s| s.gamma),
            ExposureColumn::Automation => self.automation,
        }
    }
}

/// Counts collected while mapping a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingDiagnostics {
    pub tasks_read: usize,
    pub tasks_scored: usize,
    pub missing_automated_labels: usize,
    pub missing_human_labels: usize,
    pub missing_automation_labels: usize,
    /// Labels outside the recognized sets, treated as missing
    pub unrecognized_labels: usize,
    /// Tasks skipped because their occupation code is malformed
    pub invalid_occupation_codes: usize,
}

#[derive(Debug, Clone)]
pub struct ScoreBatch {
    pub tasks: Vec<ScoredTask>,
    pub diagnostics: MappingDiagnostics,
}

/// Trait for converting categorical task labels into numeric scores
pub trait ScoreMapper {
    /// Score a single task. Returns `Ok(None)` when the task is skipped.
    fn map_task(&self, task: &TaskRecord, diagnostics: &mut MappingDiagnostics) -> Result<Option<ScoredTask>>;

    fn map_batch(&self, tasks: &[TaskRecord]) -> Result<ScoreBatch> {
        let mut diagnostics = MappingDiagnostics::default();
        let mut scored = Vec::with_capacity(tasks.len());

        for task in tasks {
            diagnostics.tasks_read += 1;
            if let Some(task) = self.map_task(task, &mut diagnostics)? {
                scored.push(task);
            }
        }
        diagnostics.tasks_scored = scored.len();

        Ok(ScoreBatch {
            tasks: scored,
            diagnostics,
        })
    }
}

/// Score mapper driven by the scoring section of the configuration
#[derive(Debug, Clone, Default)]
pub struct DefaultScoreMapper {
    pub config: ScoringConfig,
}

impl DefaultScoreMapper {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    fn exposure_scores(
        &self,
        task: &TaskRecord,
        source: RatingSource,
        diagnostics: &mut MappingDiagnostics,
    ) -> Result<Option<SchemeScores>> {
        let raw = match source {
            RatingSource::Automated => task.automated_label.as_deref(),
            RatingSource::Human => task.human_label.as_deref(),
        };

        match ExposureLabel::parse(raw) {
            ParsedLabel::Recognized(label) => Ok(Some(SchemeScores::from_label(label))),
            ParsedLabel::Missing => {
                match source {
                    RatingSource::Automated => diagnostics.missing_automated_labels += 1,
                    RatingSource::Human => diagnostics.missing_human_labels += 1,
                }
                Ok(self.missing_exposure())
            }
            ParsedLabel::Unrecognized(label) => {
                let kind = match source {
                    RatingSource::Automated => "automated exposure",
                    RatingSource::Human => "human exposure",
                };
                self.unrecognized(task, kind, label, diagnostics)?;
                Ok(self.missing_exposure())
            }
        }
    }

    fn automation_score(&self, task: &TaskRecord, diagnostics: &mut MappingDiagnostics) -> Result<Option<f64>> {
        match AutomationLabel::parse(task.automation_label.as_deref()) {
            ParsedLabel::Recognized(label) => Ok(Some(label.score())),
            ParsedLabel::Missing => {
                diagnostics.missing_automation_labels += 1;
                Ok(self.missing_automation())
            }
            ParsedLabel::Unrecognized(label) => {
                self.unrecognized(task, "automation", label, diagnostics)?;
                Ok(self.missing_automation())
            }
        }
    }

    fn missing_exposure(&self) -> Option<SchemeScores> {
        match self.config.missing_exposure {
            MissingPolicy::ZeroFill => Some(SchemeScores::ZERO),
            MissingPolicy::Exclude => None,
        }
    }

    fn missing_automation(&self) -> Option<f64> {
        match self.config.missing_automation {
            MissingPolicy::ZeroFill => Some(0.0),
            MissingPolicy::Exclude => None,
        }
    }

    fn unrecognized(
        &self,
        task: &TaskRecord,
        kind: &'static str,
        label: String,
        diagnostics: &mut MappingDiagnostics,
    ) -> Result<()> {
        if self.config.strict_labels {
            return Err(ExposureError::UnrecognizedLabel {
                kind,
                label,
                task_id: task.task_id.clone(),
                occupation_code: task.onet_soc_code.clone(),
            });
        }
        warn!(
            task_id = %task.task_id,
            occupation_code = %task.onet_soc_code,
            "Unrecognized {} label '{}', treating as missing",
            kind,
            label
        );
        diagnostics.unrecognized_labels += 1;
        Ok(())
    }
}

impl ScoreMapper for DefaultScoreMapper {
    fn map_task(&self, task: &TaskRecord, diagnostics: &mut MappingDiagnostics) -> Result<Option<ScoredTask>> {
        let code = task.onet_soc_code.trim();
        let soc_code = match derive_soc_code(code) {
            Some(soc) if is_valid_occupation_code(code) => soc,
            _ => {
                if self.config.strict_labels {
                    return Err(ExposureError::InvalidOccupationCode {
                        code: task.onet_soc_code.clone(),
                        task_id: task.task_id.clone(),
                    });
                }
                warn!(task_id = %task.task_id, "Skipping task with invalid occupation code '{}'", code);
                diagnostics.invalid_occupation_codes += 1;
                return Ok(None);
            }
        };

        let automated = self.exposure_scores(task, RatingSource::Automated, diagnostics)?;
        let human = self.exposure_scores(task, RatingSource::Human, diagnostics)?;
        let automation = self.automation_score(task, diagnostics)?;

        debug!(task_id = %task.task_id, occupation_code = %code, "Scored task");

        Ok(Some(ScoredTask {
            occupation_code: code.to_string(),
            soc_code,
            task_id: task.task_id.clone(),
            title: task.title.clone().filter(|t| !t.trim().is_empty()),
            task_type: task.task_type(),
            importance: task.importance,
            relevance: task.relevance,
            automated,
            human,
            automation,
        }))
    }
}
