use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::app::ports::ExposureOutputPort;
use crate::app::to_rows;
use crate::constants::INDUSTRIES_TABLE;
use crate::domain::{IndustryEmploymentRecord, OccupationRecord};
use crate::pipeline::processing::industry::{IndustryAggregator, IndustryOutput};

/// Use case for employment-weighted industry exposure
pub struct IndustryUseCase {
    aggregator: IndustryAggregator,
    output: Arc<dyn ExposureOutputPort>,
}

impl IndustryUseCase {
    pub fn new(output: Arc<dyn ExposureOutputPort>) -> Self {
        Self {
            aggregator: IndustryAggregator::new(),
            output,
        }
    }

    pub async fn aggregate_and_write(
        &self,
        occupations: &[OccupationRecord],
        rows: &[IndustryEmploymentRecord],
    ) -> Result<(IndustryOutput, String)> {
        let output = self.aggregator.aggregate(occupations, rows);
        crate::observability::metrics::industry::industries_aggregated(&output.diagnostics);

        let location = self
            .output
            .write_table(INDUSTRIES_TABLE, &to_rows(&output.industries)?)
            .await?;
        info!("Wrote {} industries to {}", output.industries.len(), location);

        Ok((output, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::MemoryOutput;
    use crate::pipeline::processing::test_support::{industry_row, occupation};

    #[tokio::test]
    async fn test_industry_table_written() {
        let output = Arc::new(MemoryOutput::default());
        let use_case = IndustryUseCase::new(output.clone());

        let occupations = vec![occupation("11-1011.00", 1.0), occupation("43-9021.00", 0.0)];
        let rows = vec![
            industry_row("5415", "11-1011", Some(25.0)),
            industry_row("5415", "43-9021", Some(75.0)),
            industry_row("6211", "43-9021", Some(10.0)),
        ];

        let (industries, location) = use_case.aggregate_and_write(&occupations, &rows).await.unwrap();

        assert_eq!(location, "memory://industries");
        assert_eq!(industries.industries.len(), 2);

        let tables = output.tables.lock().await;
        let written = &tables[INDUSTRIES_TABLE];
        assert_eq!(written[0]["naics_code"], "5415");
        assert_eq!(written[0]["human_gamma"], 0.25);
        assert_eq!(written[1]["naics_code"], "6211");
        assert_eq!(written[1]["human_gamma"], 0.0);
    }
}
