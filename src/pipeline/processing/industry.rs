use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::domain::{derive_soc_code, ExposureColumn, ExposureScores, IndustryEmploymentRecord, IndustryRecord, OccupationRecord};
use crate::pipeline::processing::aggregate::WeightedMean;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryDiagnostics {
    pub rows_used: usize,
    /// Rows whose SOC code has no exposure record
    pub rows_without_exposure: usize,
    /// Rows with missing or non-positive employment
    pub rows_without_employment: usize,
    pub industries_aggregated: usize,
}

#[derive(Debug, Clone)]
pub struct IndustryOutput {
    pub industries: Vec<IndustryRecord>,
    pub diagnostics: IndustryDiagnostics,
}

#[derive(Debug, Default)]
struct IndustryAccumulator {
    title: Option<String>,
    occupation_count: usize,
    employment: f64,
    columns: [WeightedMean; ExposureColumn::COUNT],
}

/// Employment-weighted exposure per NAICS industry
#[derive(Debug, Clone, Copy, Default)]
pub struct IndustryAggregator;

impl IndustryAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Occupation rows sharing a SOC code are averaged first, giving one
    /// exposure value per SOC code to weight by industry employment.
    #[instrument(skip_all, fields(occupations = occupations.len(), rows = rows.len()))]
    pub fn aggregate(&self, occupations: &[OccupationRecord], rows: &[IndustryEmploymentRecord]) -> IndustryOutput {
        let by_soc = soc_level_scores(occupations);
        let mut diagnostics = IndustryDiagnostics::default();
        let mut industries: BTreeMap<String, IndustryAccumulator> = BTreeMap::new();

        for row in rows {
            let Some(employment) = row.employment.filter(|e| e.is_finite() && *e > 0.0) else {
                diagnostics.rows_without_employment += 1;
                continue;
            };
            let Some(scores) = derive_soc_code(&row.soc_code).and_then(|soc| by_soc.get(&soc)) else {
                debug!(naics = %row.naics_code, soc_code = %row.soc_code, "No exposure for industry row");
                diagnostics.rows_without_exposure += 1;
                continue;
            };

            let acc = industries.entry(row.naics_code.trim().to_string()).or_default();
            if acc.title.is_none() {
                acc.title = row.naics_title.clone().filter(|t| !t.trim().is_empty());
            }
            acc.occupation_count += 1;
            acc.employment += employment;
            for column in ExposureColumn::ALL {
                if let Some(value) = scores.get(column) {
                    acc.columns[column.index()].add(value, employment);
                }
            }
            diagnostics.rows_used += 1;
        }

        let industries: Vec<IndustryRecord> = industries
            .into_iter()
            .map(|(naics_code, acc)| IndustryRecord {
                naics_code,
                naics_title: acc.title,
                scores: ExposureScores::from_fn(|column| acc.columns[column.index()].mean()),
                occupation_count: acc.occupation_count,
                employment: acc.employment,
            })
            .collect();
        diagnostics.industries_aggregated = industries.len();

        info!(
            "Aggregated {} industry rows into {} industries ({} without exposure, {} without employment)",
            diagnostics.rows_used,
            diagnostics.industries_aggregated,
            diagnostics.rows_without_exposure,
            diagnostics.rows_without_employment
        );

        IndustryOutput { industries, diagnostics }
    }
}

/// Unweighted mean of each column over occupation rows sharing a SOC code
pub(crate) fn soc_level_scores<'a>(
    occupations: impl IntoIterator<Item = &'a OccupationRecord>,
) -> BTreeMap<String, ExposureScores> {
    let mut pooled: BTreeMap<&str, [WeightedMean; ExposureColumn::COUNT]> = BTreeMap::new();
    for occupation in occupations {
        let columns = pooled.entry(occupation.soc_code.as_str()).or_default();
        for column in ExposureColumn::ALL {
            if let Some(value) = occupation.scores.get(column) {
                columns[column.index()].add(value, 1.0);
            }
        }
    }

    pooled
        .into_iter()
        .map(|(soc, columns)| {
            (
                soc.to_string(),
                ExposureScores::from_fn(|column| columns[column.index()].mean()),
            )
        })
        .collect()
}
