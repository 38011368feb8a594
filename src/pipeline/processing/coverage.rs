use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{TaskRecord, TaskType};
use crate::pipeline::processing::labels::{AutomationLabel, ExposureLabel, ParsedLabel};
use crate::pipeline::processing::score_mapper::ScoredTask;
use crate::pipeline::processing::weighting::{TaskWeights, WeightScheme};

const MISSING: &str = "missing";
const UNRECOGNIZED: &str = "unrecognized";

/// Label and weight coverage of a task catalog, reported before aggregating
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub tasks: usize,
    pub occupations: usize,
    pub automated_labels: BTreeMap<String, usize>,
    pub human_labels: BTreeMap<String, usize>,
    pub automation_labels: BTreeMap<String, usize>,
    pub task_types: BTreeMap<String, usize>,
    /// Scored tasks carrying a usable weight, per scheme
    pub weighted_tasks: BTreeMap<WeightScheme, usize>,
}

fn label_key<T: ToString>(parsed: ParsedLabel<T>) -> String {
    match parsed {
        ParsedLabel::Recognized(label) => label.to_string(),
        ParsedLabel::Missing => MISSING.to_string(),
        ParsedLabel::Unrecognized(_) => UNRECOGNIZED.to_string(),
    }
}

pub fn coverage(tasks: &[TaskRecord], scored: &[ScoredTask]) -> CoverageReport {
    let mut report = CoverageReport {
        tasks: tasks.len(),
        ..Default::default()
    };

    let mut occupations = BTreeSet::new();
    for task in tasks {
        occupations.insert(task.onet_soc_code.trim());
        *report
            .automated_labels
            .entry(label_key(ExposureLabel::parse(task.automated_label.as_deref())))
            .or_default() += 1;
        *report
            .human_labels
            .entry(label_key(ExposureLabel::parse(task.human_label.as_deref())))
            .or_default() += 1;
        *report
            .automation_labels
            .entry(label_key(AutomationLabel::parse(task.automation_label.as_deref())))
            .or_default() += 1;
        let task_type = match task.task_type() {
            Some(TaskType::Core) => "core",
            Some(TaskType::Supplemental) => "supplemental",
            None => "unknown",
        };
        *report.task_types.entry(task_type.to_string()).or_default() += 1;
    }
    report.occupations = occupations.len();

    let weights: Vec<TaskWeights> = scored.iter().map(TaskWeights::compute).collect();
    for scheme in WeightScheme::ALL {
        let count = weights.iter().filter(|w| w.get(scheme).is_some()).count();
        report.weighted_tasks.insert(scheme, count);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::score_mapper::{DefaultScoreMapper, ScoreMapper};
    use crate::pipeline::processing::test_support::task_record;

    #[test]
    fn test_counts_labels_and_weights() {
        let mut unrated = task_record("11-1011.00", "2", None);
        unrated.importance = None;
        unrated.task_type = Some("n/a".to_string());
        let tasks = vec![
            task_record("11-1011.00", "1", Some("E1")),
            unrated,
            task_record("13-2011.00", "3", Some("E7")),
        ];
        let scored = DefaultScoreMapper::default().map_batch(&tasks).unwrap().tasks;

        let report = coverage(&tasks, &scored);

        assert_eq!(report.tasks, 3);
        assert_eq!(report.occupations, 2);
        assert_eq!(report.automated_labels.get("E1"), Some(&1));
        assert_eq!(report.automated_labels.get(MISSING), Some(&1));
        assert_eq!(report.automated_labels.get(UNRECOGNIZED), Some(&1));
        assert_eq!(report.task_types.get("unknown"), Some(&1));
        assert_eq!(report.weighted_tasks[&WeightScheme::Equal], 3);
        assert_eq!(report.weighted_tasks[&WeightScheme::Importance], 2);
    }
}
