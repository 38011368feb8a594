use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::app::ports::ExposureOutputPort;
use crate::app::to_rows;
use crate::constants::OCCUPATIONS_TABLE;
use crate::domain::{LaborRecord, OccupationRecord};
use crate::pipeline::processing::merge::{LaborMarketMerger, MergeOutput};

/// Use case for joining labor-market data onto occupation exposure and
/// writing the merged occupation table
pub struct MergeUseCase {
    merger: LaborMarketMerger,
    output: Arc<dyn ExposureOutputPort>,
}

impl MergeUseCase {
    pub fn new(output: Arc<dyn ExposureOutputPort>) -> Self {
        Self {
            merger: LaborMarketMerger::new(),
            output,
        }
    }

    pub async fn merge_and_write(
        &self,
        occupations: &[OccupationRecord],
        labor: &[LaborRecord],
    ) -> Result<(MergeOutput, String)> {
        let merged = self.merger.merge(occupations, labor);
        crate::observability::metrics::merge::labor_merged(&merged.diagnostics);

        let location = self
            .output
            .write_table(OCCUPATIONS_TABLE, &to_rows(&merged.records)?)
            .await?;
        info!("Wrote {} merged occupations to {}", merged.records.len(), location);

        Ok((merged, location))
    }
}
