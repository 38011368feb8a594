use anyhow::{Context, Result};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::app::aggregate_use_case::AggregateUseCase;
use crate::app::industry_use_case::IndustryUseCase;
use crate::app::merge_use_case::MergeUseCase;
use crate::app::ports::{ExposureOutputPort, TableSourcePort};
use crate::config::Config;
use crate::constants::{MANIFEST_DOCUMENT, METRICS_FILE, SUMMARY_DOCUMENT};
use crate::manifest::{InputRole, RunManifest};
use crate::pipeline::processing::coverage::{coverage, CoverageReport};
use crate::pipeline::processing::summary::{summarize, ExposureSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Aggregate, merge labor data, aggregate industries, summarize
    Full,
    /// Occupation table only
    AggregateOnly,
}

impl RunMode {
    /// Inputs this mode reads, and so records in the manifest
    pub fn input_roles(&self) -> &'static [InputRole] {
        match self {
            RunMode::Full => &[InputRole::Tasks, InputRole::Labor, InputRole::Industry],
            RunMode::AggregateOnly => &[InputRole::Tasks],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Full => "full",
            RunMode::AggregateOnly => "aggregate_only",
        }
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub tasks_read: usize,
    pub tasks_scored: usize,
    pub occupations: usize,
    pub occupations_matched: Option<usize>,
    pub industries: Option<usize>,
    pub summary: Option<ExposureSummary>,
    pub outputs: Vec<String>,
    pub duration_secs: f64,
}

/// Runs the exposure stages in order against one input source and one output sink
pub struct Pipeline {
    config: Config,
    source: Arc<dyn TableSourcePort>,
    output: Arc<dyn ExposureOutputPort>,
    metrics: Option<PrometheusHandle>,
}

impl Pipeline {
    pub fn new(config: Config, source: Arc<dyn TableSourcePort>, output: Arc<dyn ExposureOutputPort>) -> Self {
        Self {
            config,
            source,
            output,
            metrics: None,
        }
    }

    /// Dump rendered metrics to the output sink at the end of each run
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    #[instrument(skip(self), fields(mode = mode.as_str()))]
    pub async fn run(&self, mode: RunMode) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = Instant::now();
        info!("🚀 Starting exposure run {} ({})", run_id, mode.as_str());

        let tasks = self.source.load_tasks().await.context("Failed to load task catalog")?;
        let inputs = self
            .source
            .describe_inputs(mode.input_roles())
            .await
            .context("Failed to checksum inputs")?;

        // All inputs are loaded before the first table is written
        let aggregate = AggregateUseCase::from_config(&self.config, self.output.clone());
        let report = aggregate.aggregate(&tasks)?;

        let mut outputs = Vec::new();
        let mut merge = None;
        let mut industry = None;
        let mut summary = None;

        if mode == RunMode::AggregateOnly {
            outputs.push(aggregate.write(&report).await?);
        } else {
            let labor = match self.source.load_labor().await.context("Failed to load labor table")? {
                Some(labor) => labor,
                None => {
                    warn!("No labor table configured; every occupation is written unmatched");
                    Vec::new()
                }
            };
            let industry_rows = self
                .source
                .load_industry()
                .await
                .context("Failed to load industry table")?;

            let merged = MergeUseCase::new(self.output.clone());
            let (merged, location) = merged.merge_and_write(&report.occupations, &labor).await?;
            outputs.push(location);

            if let Some(rows) = industry_rows {
                let industries = IndustryUseCase::new(self.output.clone());
                let (result, location) = industries.aggregate_and_write(&report.occupations, &rows).await?;
                outputs.push(location);
                industry = Some(result.diagnostics);
            }

            let exposure_summary = summarize(&merged.records, &self.config.summary.thresholds);
            outputs.push(
                self.output
                    .write_document(SUMMARY_DOCUMENT, &serde_json::to_value(&exposure_summary)?)
                    .await?,
            );
            summary = Some(exposure_summary);
            merge = Some(merged.diagnostics);
        }

        let duration_secs = timer.elapsed().as_secs_f64();
        crate::observability::metrics::run::duration(duration_secs);

        if let Some(handle) = &self.metrics {
            outputs.push(self.output.write_text(METRICS_FILE, &handle.render()).await?);
        }

        let manifest = RunManifest {
            run_id,
            started_at,
            finished_at: Utc::now(),
            mode: mode.as_str().to_string(),
            config: self.config.clone(),
            inputs,
            mapping: report.mapping.clone(),
            aggregation: report.aggregation.clone(),
            merge: merge.clone(),
            industry: industry.clone(),
            outputs: outputs.clone(),
        };
        outputs.push(
            self.output
                .write_document(MANIFEST_DOCUMENT, &serde_json::to_value(&manifest)?)
                .await?,
        );

        info!(
            "✅ Run {} finished in {:.2}s: {} occupations from {} tasks",
            run_id,
            duration_secs,
            report.occupations.len(),
            report.mapping.tasks_scored
        );

        Ok(PipelineResult {
            run_id,
            tasks_read: report.mapping.tasks_read,
            tasks_scored: report.mapping.tasks_scored,
            occupations: report.occupations.len(),
            occupations_matched: merge.map(|m| m.occupations_matched),
            industries: industry.map(|i| i.industries_aggregated),
            summary,
            outputs,
            duration_secs,
        })
    }

    /// Score the task catalog and report label and weight coverage; writes nothing
    #[instrument(skip(self))]
    pub async fn check(&self) -> Result<CoverageReport> {
        let tasks = self.source.load_tasks().await.context("Failed to load task catalog")?;
        let report = AggregateUseCase::from_config(&self.config, self.output.clone()).aggregate(&tasks)?;
        let coverage = coverage(&tasks, &report.scored_tasks);
        info!(
            "🔍 Checked {} tasks across {} occupations",
            coverage.tasks, coverage.occupations
        );
        Ok(coverage)
    }
}
