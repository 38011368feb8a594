use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{ExposureColumn, ExposureScores, MergedRecord};
use crate::pipeline::processing::aggregate::WeightedMean;
use crate::pipeline::processing::industry::soc_level_scores;

/// Share of occupations and of employment at or above one exposure level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdShare {
    pub threshold: f64,
    pub occupations_at_or_above: usize,
    pub occupation_share: Option<f64>,
    /// `None` when no scored occupation has employment
    pub employment_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: ExposureColumn,
    /// Occupations with a value in this column
    pub occupations_scored: usize,
    pub mean: Option<f64>,
    pub employment_weighted_mean: Option<f64>,
    pub thresholds: Vec<ThresholdShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureSummary {
    pub occupations: usize,
    pub occupations_with_employment: usize,
    /// Employment counted once per SOC code
    pub total_employment: f64,
    pub columns: Vec<ColumnSummary>,
}

/// Distribution of each exposure column over the merged table.
///
/// Occupation counts and shares are per occupation row. Employment figures
/// are per SOC code: detailed occupations sharing a labor row are pooled
/// (unweighted, as for industries) and that row's employment is used once.
pub fn summarize(records: &[MergedRecord], thresholds: &[f64]) -> ExposureSummary {
    let employment_of = |r: &MergedRecord| r.employment.filter(|e| e.is_finite() && *e > 0.0);

    let mut soc_employment: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        if let Some(employment) = employment_of(record) {
            soc_employment
                .entry(record.occupation.soc_code.as_str())
                .or_insert(employment);
        }
    }
    let soc_scores = soc_level_scores(records.iter().map(|r| &r.occupation));
    let employed: Vec<(&ExposureScores, f64)> = soc_employment
        .iter()
        .filter_map(|(soc, employment)| soc_scores.get(*soc).map(|scores| (scores, *employment)))
        .collect();

    let columns = ExposureColumn::ALL
        .iter()
        .map(|&column| {
            let scored: Vec<f64> = records
                .iter()
                .filter_map(|r| r.occupation.scores.get(column))
                .collect();
            let scored_employment: Vec<(f64, f64)> = employed
                .iter()
                .filter_map(|(scores, employment)| scores.get(column).map(|v| (v, *employment)))
                .collect();

            let mut mean = WeightedMean::default();
            for value in &scored {
                mean.add(*value, 1.0);
            }
            let mut weighted = WeightedMean::default();
            for (value, employment) in &scored_employment {
                weighted.add(*value, *employment);
            }

            let thresholds = thresholds
                .iter()
                .map(|&threshold| {
                    let at_or_above = scored.iter().filter(|v| **v >= threshold).count();
                    let mut employment_share = WeightedMean::default();
                    for (value, employment) in &scored_employment {
                        employment_share.add(if *value >= threshold { 1.0 } else { 0.0 }, *employment);
                    }
                    ThresholdShare {
                        threshold,
                        occupations_at_or_above: at_or_above,
                        occupation_share: (!scored.is_empty()).then(|| at_or_above as f64 / scored.len() as f64),
                        employment_share: employment_share.mean(),
                    }
                })
                .collect();

            ColumnSummary {
                column,
                occupations_scored: scored.len(),
                mean: mean.mean(),
                employment_weighted_mean: weighted.mean(),
                thresholds,
            }
        })
        .collect();

    ExposureSummary {
        occupations: records.len(),
        occupations_with_employment: records.iter().filter(|r| employment_of(r).is_some()).count(),
        total_employment: soc_employment.values().sum(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::merge::LaborMarketMerger;
    use crate::pipeline::processing::test_support::{labor_row, occupation};

    fn column(summary: &ExposureSummary, column: ExposureColumn) -> &ColumnSummary {
        summary.columns.iter().find(|c| c.column == column).unwrap()
    }

    #[test]
    fn test_threshold_shares() {
        let occupations = vec![
            occupation("11-1011.00", 0.8),
            occupation("13-2011.00", 0.2),
            occupation("15-1252.00", 0.05),
        ];
        let labor = vec![
            labor_row("11-1011", Some(100.0), None),
            labor_row("13-2011", Some(300.0), None),
        ];
        let merged = LaborMarketMerger::new().merge(&occupations, &labor).records;

        let summary = summarize(&merged, &[0.1, 0.5]);
        let beta = column(&summary, ExposureColumn::HumanBeta);

        assert_eq!(summary.occupations, 3);
        assert_eq!(summary.occupations_with_employment, 2);
        assert_eq!(summary.total_employment, 400.0);
        assert_eq!(beta.occupations_scored, 3);
        assert_eq!(beta.thresholds[0].occupations_at_or_above, 2);
        assert!((beta.thresholds[0].occupation_share.unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(beta.thresholds[0].employment_share, Some(1.0));
        assert_eq!(beta.thresholds[1].occupations_at_or_above, 1);
        assert_eq!(beta.thresholds[1].employment_share, Some(0.25));
        assert!((beta.employment_weighted_mean.unwrap() - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_shared_labor_row_counts_employment_once() {
        let occupations = vec![
            occupation("11-1011.00", 1.0),
            occupation("11-1011.03", 1.0),
            occupation("13-2011.00", 0.0),
        ];
        let labor = vec![
            labor_row("11-1011", Some(100.0), None),
            labor_row("13-2011", Some(100.0), None),
        ];
        let merged = LaborMarketMerger::new().merge(&occupations, &labor).records;

        let summary = summarize(&merged, &[0.5]);
        let gamma = column(&summary, ExposureColumn::HumanGamma);

        assert_eq!(summary.occupations_with_employment, 3);
        assert_eq!(summary.total_employment, 200.0);
        assert_eq!(gamma.employment_weighted_mean, Some(0.5));
        assert_eq!(gamma.thresholds[0].employment_share, Some(0.5));
        assert_eq!(gamma.thresholds[0].occupations_at_or_above, 2);
    }

    #[test]
    fn test_empty_table() {
        let summary = summarize(&[], &[0.5]);
        assert_eq!(summary.occupations, 0);
        let alpha = column(&summary, ExposureColumn::AutomatedAlpha);
        assert_eq!(alpha.mean, None);
        assert_eq!(alpha.thresholds[0].occupation_share, None);
        assert_eq!(alpha.thresholds[0].employment_share, None);
    }
}
