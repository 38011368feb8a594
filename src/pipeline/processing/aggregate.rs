use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, instrument};

use crate::domain::{ExposureColumn, ExposureScores, OccupationRecord};
use crate::pipeline::processing::score_mapper::ScoredTask;
use crate::pipeline::processing::weighting::WeightScheme;

/// Running Σ(value·weight) and Σ(weight) for one column of one group.
///
/// The mean is undefined when no positive weight was added.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
    weighted_sum: f64,
    weight_sum: f64,
}

impl WeightedMean {
    pub fn add(&mut self, value: f64, weight: f64) {
        self.weighted_sum += value * weight;
        self.weight_sum += weight;
    }

    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    pub fn mean(&self) -> Option<f64> {
        if self.weight_sum > 0.0 {
            Some(self.weighted_sum / self.weight_sum)
        } else {
            None
        }
    }
}

/// Which code tasks are grouped by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupationGrouping {
    /// Full O*NET-SOC code (`XX-XXXX.XX`)
    #[default]
    Onet,
    /// Derived SOC code (`XX-XXXX`), pooling detailed O*NET occupations
    Soc,
}

impl OccupationGrouping {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccupationGrouping::Onet => "onet",
            OccupationGrouping::Soc => "soc",
        }
    }

    fn key<'a>(&self, task: &'a ScoredTask) -> &'a str {
        match self {
            OccupationGrouping::Onet => &task.occupation_code,
            OccupationGrouping::Soc => &task.soc_code,
        }
    }
}

impl fmt::Display for OccupationGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OccupationGrouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onet" => Ok(OccupationGrouping::Onet),
            "soc" => Ok(OccupationGrouping::Soc),
            other => Err(format!("unknown grouping '{}' (expected onet or soc)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationDiagnostics {
    pub weights: WeightScheme,
    pub grouping: OccupationGrouping,
    /// Tasks that contributed to some occupation
    pub tasks_weighted: usize,
    /// Tasks dropped because the scheme gave them no weight
    pub tasks_without_weight: usize,
    pub occupations_aggregated: usize,
    /// Occupations left out because their total weight was zero
    pub zero_weight_occupations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AggregationOutput {
    pub occupations: Vec<OccupationRecord>,
    pub diagnostics: AggregationDiagnostics,
}

#[derive(Debug, Default)]
struct OccupationAccumulator {
    soc_code: String,
    /// (occupation code the title came from, title)
    title: Option<(String, String)>,
    task_count: usize,
    weight_sum: f64,
    columns: [WeightedMean; ExposureColumn::COUNT],
}

impl OccupationAccumulator {
    fn offer_title(&mut self, task: &ScoredTask) {
        let Some(title) = &task.title else { return };
        let replace = match &self.title {
            None => true,
            Some((code, _)) => task.occupation_code < *code,
        };
        if replace {
            self.title = Some((task.occupation_code.clone(), title.clone()));
        }
    }
}

/// Collapses scored tasks into one weighted-mean row per occupation
#[derive(Debug, Clone, Copy, Default)]
pub struct OccupationAggregator {
    pub grouping: OccupationGrouping,
    pub weights: WeightScheme,
}

impl OccupationAggregator {
    pub fn new(grouping: OccupationGrouping, weights: WeightScheme) -> Self {
        Self { grouping, weights }
    }

    /// Weighted mean of every exposure column per occupation.
    ///
    /// Each column is folded independently, so a task without a score in one
    /// column still counts toward the others. Output is ordered by occupation code.
    #[instrument(skip(self, tasks), fields(weights = %self.weights, grouping = %self.grouping))]
    pub fn aggregate(&self, tasks: &[ScoredTask]) -> AggregationOutput {
        let mut groups: BTreeMap<String, OccupationAccumulator> = BTreeMap::new();
        let mut diagnostics = AggregationDiagnostics {
            weights: self.weights,
            grouping: self.grouping,
            ..Default::default()
        };

        for task in tasks {
            let acc = groups
                .entry(self.grouping.key(task).to_string())
                .or_insert_with(|| OccupationAccumulator {
                    soc_code: task.soc_code.clone(),
                    ..Default::default()
                });
            acc.offer_title(task);

            let Some(weight) = self.weights.weight(task) else {
                debug!(task_id = %task.task_id, "No {} weight, excluding task", self.weights);
                diagnostics.tasks_without_weight += 1;
                continue;
            };

            diagnostics.tasks_weighted += 1;
            acc.task_count += 1;
            acc.weight_sum += weight;
            for column in ExposureColumn::ALL {
                if let Some(value) = task.column(column) {
                    acc.columns[column.index()].add(value, weight);
                }
            }
        }

        let mut occupations = Vec::with_capacity(groups.len());
        for (code, acc) in groups {
            if acc.weight_sum <= 0.0 {
                debug!(occupation_code = %code, "Zero total weight, excluding occupation");
                diagnostics.zero_weight_occupations.push(code);
                continue;
            }
            occupations.push(OccupationRecord {
                soc_code: acc.soc_code,
                title: acc.title.map(|(_, title)| title),
                scores: ExposureScores::from_fn(|column| acc.columns[column.index()].mean()),
                task_count: acc.task_count,
                weight_sum: acc.weight_sum,
                occupation_code: code,
            });
        }
        diagnostics.occupations_aggregated = occupations.len();

        info!(
            "Aggregated {} tasks into {} occupations ({} tasks without weight, {} occupations with zero weight)",
            diagnostics.tasks_weighted,
            diagnostics.occupations_aggregated,
            diagnostics.tasks_without_weight,
            diagnostics.zero_weight_occupations.len()
        );

        AggregationOutput {
            occupations,
            diagnostics,
        }
    }
}
