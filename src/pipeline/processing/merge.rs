use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

use crate::domain::{derive_soc_code, LaborRecord, MergedRecord, OccupationRecord};

/// Natural log of a positive finite value; anything else is missing
pub fn positive_ln(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0).map(f64::ln)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeDiagnostics {
    pub occupations_matched: usize,
    /// Occupations kept with null labor fields
    pub occupations_unmatched: usize,
    /// Labor rows ignored because an earlier row had the same SOC code
    pub duplicate_labor_rows: usize,
    /// Labor rows whose code has no SOC prefix
    pub invalid_labor_codes: usize,
}

#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub records: Vec<MergedRecord>,
    pub diagnostics: MergeDiagnostics,
}

/// Left-joins labor-market rows onto occupation rows by SOC code
#[derive(Debug, Clone, Copy, Default)]
pub struct LaborMarketMerger;

impl LaborMarketMerger {
    pub fn new() -> Self {
        Self
    }

    /// Every occupation appears exactly once in the output, in input order.
    #[instrument(skip_all, fields(occupations = occupations.len(), labor_rows = labor.len()))]
    pub fn merge(&self, occupations: &[OccupationRecord], labor: &[LaborRecord]) -> MergeOutput {
        let mut diagnostics = MergeDiagnostics::default();
        let mut by_soc: HashMap<String, &LaborRecord> = HashMap::with_capacity(labor.len());

        for row in labor {
            let Some(key) = derive_soc_code(&row.soc_code) else {
                warn!("Ignoring labor row with invalid code '{}'", row.soc_code);
                diagnostics.invalid_labor_codes += 1;
                continue;
            };
            if by_soc.contains_key(&key) {
                warn!(soc_code = %key, "Duplicate labor row, keeping the first");
                diagnostics.duplicate_labor_rows += 1;
                continue;
            }
            by_soc.insert(key, row);
        }

        let records: Vec<MergedRecord> = occupations
            .iter()
            .map(|occupation| {
                let labor = by_soc.get(&occupation.soc_code).copied();
                match labor {
                    Some(_) => diagnostics.occupations_matched += 1,
                    None => diagnostics.occupations_unmatched += 1,
                }
                merged_record(occupation, labor)
            })
            .collect();

        info!(
            "Merged labor data: {} matched, {} unmatched, {} duplicate labor rows",
            diagnostics.occupations_matched, diagnostics.occupations_unmatched, diagnostics.duplicate_labor_rows
        );

        MergeOutput { records, diagnostics }
    }
}

fn merged_record(occupation: &OccupationRecord, labor: Option<&LaborRecord>) -> MergedRecord {
    let employment = labor.and_then(|l| l.employment);
    let mean_annual_wage = labor.and_then(|l| l.mean_annual_wage);
    let median_annual_wage = labor.and_then(|l| l.median_annual_wage);

    MergedRecord {
        occupation: occupation.clone(),
        labor_matched: labor.is_some(),
        employment,
        mean_annual_wage,
        median_annual_wage,
        mean_hourly_wage: labor.and_then(|l| l.mean_hourly_wage),
        median_hourly_wage: labor.and_then(|l| l.median_hourly_wage),
        log_employment: positive_ln(employment),
        log_mean_annual_wage: positive_ln(mean_annual_wage),
        log_median_annual_wage: positive_ln(median_annual_wage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::test_support::{labor_row, occupation};

    #[test]
    fn test_positive_ln() {
        assert_eq!(positive_ln(Some(1.0)), Some(0.0));
        assert_eq!(positive_ln(Some(0.0)), None);
        assert_eq!(positive_ln(Some(-5.0)), None);
        assert_eq!(positive_ln(Some(f64::NAN)), None);
        assert_eq!(positive_ln(None), None);
        assert!((positive_ln(Some(std::f64::consts::E)).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_left_join_keeps_unmatched_occupations() {
        let occupations = vec![occupation("11-1011.00", 0.5), occupation("13-2011.00", 0.25)];
        let labor = vec![labor_row("11-1011", Some(200_000.0), Some(250_000.0))];

        let output = LaborMarketMerger::new().merge(&occupations, &labor);

        assert_eq!(output.records.len(), 2);
        assert!(output.records[0].labor_matched);
        assert_eq!(output.records[0].employment, Some(200_000.0));
        assert!(!output.records[1].labor_matched);
        assert_eq!(output.records[1].occupation.occupation_code, "13-2011.00");
        assert_eq!(output.records[1].employment, None);
        assert_eq!(output.records[1].median_annual_wage, None);
        assert_eq!(output.records[1].log_employment, None);
        assert_eq!(output.diagnostics.occupations_unmatched, 1);
    }

    #[test]
    fn test_detailed_onet_codes_share_one_labor_row() {
        let occupations = vec![occupation("11-1011.00", 0.5), occupation("11-1011.03", 0.1)];
        let labor = vec![labor_row("11-1011", Some(1000.0), Some(90_000.0))];

        let output = LaborMarketMerger::new().merge(&occupations, &labor);

        assert!(output.records.iter().all(|r| r.employment == Some(1000.0)));
        assert_eq!(output.diagnostics.occupations_matched, 2);
    }

    #[test]
    fn test_non_positive_wage_logs_are_missing() {
        let occupations = vec![occupation("11-1011.00", 0.5)];
        let labor = vec![labor_row("11-1011", Some(0.0), Some(-10.0))];

        let output = LaborMarketMerger::new().merge(&occupations, &labor);
        let record = &output.records[0];

        assert!(record.labor_matched);
        assert_eq!(record.employment, Some(0.0));
        assert_eq!(record.log_employment, None);
        assert_eq!(record.log_mean_annual_wage, None);
        assert_eq!(record.log_median_annual_wage, None);
    }

    #[test]
    fn test_duplicate_labor_rows_keep_first() {
        let occupations = vec![occupation("11-1011.00", 0.5)];
        let labor = vec![
            labor_row("11-1011", Some(100.0), None),
            labor_row("11-1011", Some(999.0), None),
            labor_row("bad", Some(1.0), None),
        ];

        let output = LaborMarketMerger::new().merge(&occupations, &labor);

        assert_eq!(output.records[0].employment, Some(100.0));
        assert_eq!(output.diagnostics.duplicate_labor_rows, 1);
        assert_eq!(output.diagnostics.invalid_labor_codes, 1);
    }
}
