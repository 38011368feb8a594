use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::app::ports::ExposureOutputPort;
use crate::app::to_rows;
use crate::config::Config;
use crate::constants::OCCUPATIONS_TABLE;
use crate::domain::{OccupationRecord, TaskRecord};
use crate::pipeline::processing::aggregate::{AggregationDiagnostics, OccupationAggregator};
use crate::pipeline::processing::score_mapper::{DefaultScoreMapper, MappingDiagnostics, ScoreMapper, ScoredTask};

/// Result of scoring and aggregating one task catalog
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub occupations: Vec<OccupationRecord>,
    pub scored_tasks: Vec<ScoredTask>,
    pub mapping: MappingDiagnostics,
    pub aggregation: AggregationDiagnostics,
}

/// Use case for turning rated tasks into occupation-level exposure
pub struct AggregateUseCase {
    mapper: Box<dyn ScoreMapper + Send + Sync>,
    aggregator: OccupationAggregator,
    output: Arc<dyn ExposureOutputPort>,
}

impl AggregateUseCase {
    pub fn new(
        mapper: Box<dyn ScoreMapper + Send + Sync>,
        aggregator: OccupationAggregator,
        output: Arc<dyn ExposureOutputPort>,
    ) -> Self {
        Self {
            mapper,
            aggregator,
            output,
        }
    }

    /// Create a use case with the default score mapper and the configured scheme
    pub fn from_config(config: &Config, output: Arc<dyn ExposureOutputPort>) -> Self {
        Self {
            mapper: Box::new(DefaultScoreMapper::new(config.scoring.clone())),
            aggregator: OccupationAggregator::new(config.aggregation.grouping, config.aggregation.weights),
            output,
        }
    }

    /// Score and aggregate tasks without writing anything
    pub fn aggregate(&self, tasks: &[TaskRecord]) -> Result<AggregateReport> {
        let batch = self.mapper.map_batch(tasks).context("Failed to score tasks")?;
        crate::observability::metrics::scoring::batch_scored(&batch.diagnostics);

        let output = self.aggregator.aggregate(&batch.tasks);
        crate::observability::metrics::aggregation::occupations_aggregated(&output);

        Ok(AggregateReport {
            occupations: output.occupations,
            scored_tasks: batch.tasks,
            mapping: batch.diagnostics,
            aggregation: output.diagnostics,
        })
    }

    /// Write the unmerged occupation table of `report`
    pub async fn write(&self, report: &AggregateReport) -> Result<String> {
        let location = self
            .output
            .write_table(OCCUPATIONS_TABLE, &to_rows(&report.occupations)?)
            .await?;
        info!("Wrote {} occupations to {}", report.occupations.len(), location);
        Ok(location)
    }

    /// Score, aggregate, and write the occupation table
    pub async fn aggregate_and_write(&self, tasks: &[TaskRecord]) -> Result<(AggregateReport, String)> {
        let report = self.aggregate(tasks)?;
        let location = self.write(&report).await?;
        Ok((report, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::MemoryOutput;
    use crate::config::ScoringConfig;
    use crate::error::ExposureError;
    use crate::pipeline::processing::aggregate::OccupationGrouping;
    use crate::pipeline::processing::test_support::task_record;
    use crate::pipeline::processing::weighting::WeightScheme;

    #[tokio::test]
    async fn test_aggregate_use_case_writes_occupations() {
        let output = Arc::new(MemoryOutput::default());
        let use_case = AggregateUseCase::from_config(&Config::default(), output.clone());

        let tasks = vec![
            task_record("15-1252.00", "1", Some("E1")),
            task_record("15-1252.00", "2", Some("E2")),
            task_record("43-9021.00", "3", Some("E0")),
        ];

        let (report, location) = use_case.aggregate_and_write(&tasks).await.unwrap();

        assert_eq!(location, "memory://occupations");
        assert_eq!(report.occupations.len(), 2);
        assert_eq!(report.mapping.tasks_scored, 3);

        let tables = output.tables.lock().await;
        let rows = &tables[OCCUPATIONS_TABLE];
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["occupation_code"], "15-1252.00");
        assert_eq!(rows[0]["automated_beta"], 0.75);
        assert_eq!(rows[1]["automated_gamma"], 0.0);
    }

    #[test]
    fn test_strict_mapper_error_propagates() {
        let output = Arc::new(MemoryOutput::default());
        let use_case = AggregateUseCase::new(
            Box::new(DefaultScoreMapper::new(ScoringConfig {
                strict_labels: true,
                ..Default::default()
            })),
            OccupationAggregator::new(OccupationGrouping::Onet, WeightScheme::Equal),
            output,
        );

        let err = use_case
            .aggregate(&[task_record("15-1252.00", "1", Some("E4"))])
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ExposureError>(),
            Some(ExposureError::UnrecognizedLabel { .. })
        ));
    }
}
