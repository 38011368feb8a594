//! Run metrics for the exposure pipeline
//!
//! Stages record through the `metrics` facade. Nothing is collected unless a
//! recorder is installed; the binary installs the Prometheus recorder when
//! `output.prometheus` is enabled and dumps its text rendering after the run.

use std::fmt;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Enum representing all metric names used in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Input metrics
    InputRowsLoaded,

    // Scoring metrics
    ScoringTasksScored,
    ScoringLabelsMissing,
    ScoringLabelsUnrecognized,
    ScoringInvalidCodes,

    // Aggregation metrics
    AggregationTasksWithoutWeight,
    AggregationOccupations,
    AggregationZeroWeightOccupations,
    AggregationTasksPerOccupation,

    // Merge metrics
    MergeMatched,
    MergeUnmatched,
    MergeDuplicateLaborRows,

    // Industry metrics
    IndustryIndustries,
    IndustryRowsSkipped,

    // Run metrics
    RunDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::InputRowsLoaded => "exposure_input_rows_loaded_total",

            MetricName::ScoringTasksScored => "exposure_scoring_tasks_scored_total",
            MetricName::ScoringLabelsMissing => "exposure_scoring_labels_missing_total",
            MetricName::ScoringLabelsUnrecognized => "exposure_scoring_labels_unrecognized_total",
            MetricName::ScoringInvalidCodes => "exposure_scoring_invalid_codes_total",

            MetricName::AggregationTasksWithoutWeight => "exposure_aggregation_tasks_without_weight_total",
            MetricName::AggregationOccupations => "exposure_aggregation_occupations_total",
            MetricName::AggregationZeroWeightOccupations => "exposure_aggregation_zero_weight_occupations_total",
            MetricName::AggregationTasksPerOccupation => "exposure_aggregation_tasks_per_occupation",

            MetricName::MergeMatched => "exposure_merge_matched_total",
            MetricName::MergeUnmatched => "exposure_merge_unmatched_total",
            MetricName::MergeDuplicateLaborRows => "exposure_merge_duplicate_labor_rows_total",

            MetricName::IndustryIndustries => "exposure_industry_industries_total",
            MetricName::IndustryRowsSkipped => "exposure_industry_rows_skipped_total",

            MetricName::RunDuration => "exposure_run_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus recorder as the global metrics recorder
pub fn init_prometheus() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    info!("Metrics recorder installed");
    Ok(handle)
}

// ============================================================================
// Input Metrics
// ============================================================================

pub mod input {
    use super::MetricName;

    /// Record rows loaded from one input table
    pub fn rows_loaded(table: &'static str, count: usize) {
        ::metrics::counter!(MetricName::InputRowsLoaded.as_str(), "table" => table).increment(count as u64);
    }
}

// ============================================================================
// Scoring Metrics
// ============================================================================

pub mod scoring {
    use super::MetricName;
    use crate::pipeline::processing::score_mapper::{MappingDiagnostics, RatingSource};

    /// Record the outcome of scoring one batch of tasks
    pub fn batch_scored(diagnostics: &MappingDiagnostics) {
        ::metrics::counter!(MetricName::ScoringTasksScored.as_str()).increment(diagnostics.tasks_scored as u64);
        ::metrics::counter!(MetricName::ScoringLabelsMissing.as_str(), "source" => RatingSource::Automated.as_str())
            .increment(diagnostics.missing_automated_labels as u64);
        ::metrics::counter!(MetricName::ScoringLabelsMissing.as_str(), "source" => RatingSource::Human.as_str())
            .increment(diagnostics.missing_human_labels as u64);
        ::metrics::counter!(MetricName::ScoringLabelsMissing.as_str(), "source" => "automation")
            .increment(diagnostics.missing_automation_labels as u64);
        ::metrics::counter!(MetricName::ScoringLabelsUnrecognized.as_str())
            .increment(diagnostics.unrecognized_labels as u64);
        ::metrics::counter!(MetricName::ScoringInvalidCodes.as_str())
            .increment(diagnostics.invalid_occupation_codes as u64);
    }
}

// ============================================================================
// Aggregation Metrics
// ============================================================================

pub mod aggregation {
    use super::MetricName;
    use crate::pipeline::processing::aggregate::AggregationOutput;

    /// Record occupation counts and the task-count distribution
    pub fn occupations_aggregated(output: &AggregationOutput) {
        let weights = output.diagnostics.weights.as_str();
        ::metrics::counter!(MetricName::AggregationTasksWithoutWeight.as_str(), "weights" => weights)
            .increment(output.diagnostics.tasks_without_weight as u64);
        ::metrics::counter!(MetricName::AggregationOccupations.as_str(), "weights" => weights)
            .increment(output.occupations.len() as u64);
        ::metrics::counter!(MetricName::AggregationZeroWeightOccupations.as_str(), "weights" => weights)
            .increment(output.diagnostics.zero_weight_occupations.len() as u64);
        for occupation in &output.occupations {
            ::metrics::histogram!(MetricName::AggregationTasksPerOccupation.as_str())
                .record(occupation.task_count as f64);
        }
    }
}

// ============================================================================
// Merge Metrics
// ============================================================================

pub mod merge {
    use super::MetricName;
    use crate::pipeline::processing::merge::MergeDiagnostics;

    pub fn labor_merged(diagnostics: &MergeDiagnostics) {
        ::metrics::counter!(MetricName::MergeMatched.as_str()).increment(diagnostics.occupations_matched as u64);
        ::metrics::counter!(MetricName::MergeUnmatched.as_str()).increment(diagnostics.occupations_unmatched as u64);
        ::metrics::counter!(MetricName::MergeDuplicateLaborRows.as_str())
            .increment(diagnostics.duplicate_labor_rows as u64);
    }
}

// ============================================================================
// Industry Metrics
// ============================================================================

pub mod industry {
    use super::MetricName;
    use crate::pipeline::processing::industry::IndustryDiagnostics;

    pub fn industries_aggregated(diagnostics: &IndustryDiagnostics) {
        ::metrics::counter!(MetricName::IndustryIndustries.as_str())
            .increment(diagnostics.industries_aggregated as u64);
        ::metrics::counter!(MetricName::IndustryRowsSkipped.as_str(), "reason" => "no_exposure")
            .increment(diagnostics.rows_without_exposure as u64);
        ::metrics::counter!(MetricName::IndustryRowsSkipped.as_str(), "reason" => "no_employment")
            .increment(diagnostics.rows_without_employment as u64);
    }
}

// ============================================================================
// Run Metrics
// ============================================================================

pub mod run {
    use super::MetricName;

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::RunDuration.as_str()).record(secs);
    }
}
