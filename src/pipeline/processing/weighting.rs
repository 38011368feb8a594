use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{CORE_TASK_WEIGHT, SUPPLEMENTAL_TASK_WEIGHT, UNKNOWN_TASK_TYPE_WEIGHT};
use crate::domain::TaskType;
use crate::pipeline::processing::score_mapper::ScoredTask;

/// How tasks are weighted within an occupation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightScheme {
    /// Every task counts once
    #[default]
    Equal,
    /// Core tasks count twice as much as supplemental ones
    Core,
    /// O*NET importance rating
    Importance,
    /// O*NET relevance rating
    Relevance,
}

impl WeightScheme {
    pub const ALL: [WeightScheme; 4] = [
        WeightScheme::Equal,
        WeightScheme::Core,
        WeightScheme::Importance,
        WeightScheme::Relevance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightScheme::Equal => "equal",
            WeightScheme::Core => "core",
            WeightScheme::Importance => "importance",
            WeightScheme::Relevance => "relevance",
        }
    }

    /// Weight of `task` under this scheme.
    ///
    /// `None` when the scheme's rating is missing, negative or not finite; the
    /// task is then left out of aggregation under this scheme only.
    pub fn weight(&self, task: &ScoredTask) -> Option<f64> {
        let raw = match self {
            WeightScheme::Equal => Some(1.0),
            WeightScheme::Core => Some(match task.task_type {
                Some(TaskType::Core) => CORE_TASK_WEIGHT,
                Some(TaskType::Supplemental) => SUPPLEMENTAL_TASK_WEIGHT,
                None => UNKNOWN_TASK_TYPE_WEIGHT,
            }),
            WeightScheme::Importance => task.importance,
            WeightScheme::Relevance => task.relevance,
        };
        raw.filter(|w| w.is_finite() && *w >= 0.0)
    }
}

impl fmt::Display for WeightScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(WeightScheme::Equal),
            "core" => Ok(WeightScheme::Core),
            "importance" => Ok(WeightScheme::Importance),
            "relevance" => Ok(WeightScheme::Relevance),
            other => Err(format!(
                "unknown weight scheme '{}' (expected equal, core, importance or relevance)",
                other
            )),
        }
    }
}

/// All four weight columns of one task
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskWeights {
    pub equal: Option<f64>,
    pub core: Option<f64>,
    pub importance: Option<f64>,
    pub relevance: Option<f64>,
}

impl TaskWeights {
    pub fn compute(task: &ScoredTask) -> Self {
        Self {
            equal: WeightScheme::Equal.weight(task),
            core: WeightScheme::Core.weight(task),
            importance: WeightScheme::Importance.weight(task),
            relevance: WeightScheme::Relevance.weight(task),
        }
    }

    pub fn get(&self, scheme: WeightScheme) -> Option<f64> {
        match scheme {
            WeightScheme::Equal => self.equal,
            WeightScheme::Core => self.core,
            WeightScheme::Importance => self.importance,
            WeightScheme::Relevance => self.relevance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::test_support::scored_task;

    #[test]
    fn test_equal_weight_is_constant() {
        let mut task = scored_task("11-1011.00", Some("E1"));
        task.importance = None;
        task.relevance = None;
        task.task_type = None;
        assert_eq!(WeightScheme::Equal.weight(&task), Some(1.0));
    }

    #[test]
    fn test_core_weights() {
        let mut task = scored_task("11-1011.00", Some("E1"));
        task.task_type = Some(TaskType::Core);
        assert_eq!(WeightScheme::Core.weight(&task), Some(2.0));
        task.task_type = Some(TaskType::Supplemental);
        assert_eq!(WeightScheme::Core.weight(&task), Some(1.0));
        task.task_type = None;
        assert_eq!(WeightScheme::Core.weight(&task), Some(1.0));
    }

    #[test]
    fn test_rating_weights_used_as_is() {
        let mut task = scored_task("11-1011.00", Some("E1"));
        task.importance = Some(3.7);
        task.relevance = Some(64.0);
        let weights = TaskWeights::compute(&task);
        assert_eq!(weights.get(WeightScheme::Importance), Some(3.7));
        assert_eq!(weights.get(WeightScheme::Relevance), Some(64.0));
    }

    #[test]
    fn test_missing_or_invalid_rating_has_no_weight() {
        let mut task = scored_task("11-1011.00", Some("E1"));
        task.importance = None;
        task.relevance = Some(-1.0);
        let weights = TaskWeights::compute(&task);
        assert_eq!(weights.importance, None);
        assert_eq!(weights.relevance, None);
        assert_eq!(weights.equal, Some(1.0));
    }

    #[test]
    fn test_parse_scheme() {
        assert_eq!("Importance".parse::<WeightScheme>(), Ok(WeightScheme::Importance));
        assert!("salience".parse::<WeightScheme>().is_err());
        for scheme in WeightScheme::ALL {
            assert_eq!(scheme.as_str().parse::<WeightScheme>(), Ok(scheme));
        }
    }
}
