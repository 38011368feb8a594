use serde::{Deserialize, Serialize};
use std::fmt;

/// Exposure category assigned to a task by a rater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExposureLabel {
    /// No exposure
    E0,
    /// Direct exposure: the model alone cuts task time substantially
    E1,
    /// Exposure given additional software built on the model
    E2,
    /// Exposure given image capabilities
    E3,
}

/// Mapping from exposure label to numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureScheme {
    /// Direct exposure only
    Alpha,
    /// Direct exposure plus half of the augmented categories
    Beta,
    /// Any exposure
    Gamma,
}

/// Five-level automation label, `T0` (none) through `T4` (full automation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AutomationLabel {
    T0,
    T1,
    T2,
    T3,
    T4,
}

/// Outcome of reading a raw label cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLabel<T> {
    Missing,
    Recognized(T),
    Unrecognized(String),
}

impl ExposureLabel {
    pub const ALL: [ExposureLabel; 4] = [ExposureLabel::E0, ExposureLabel::E1, ExposureLabel::E2, ExposureLabel::E3];

    pub fn parse(raw: Option<&str>) -> ParsedLabel<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return ParsedLabel::Missing;
        };
        match raw.to_ascii_uppercase().as_str() {
            "E0" => ParsedLabel::Recognized(ExposureLabel::E0),
            "E1" => ParsedLabel::Recognized(ExposureLabel::E1),
            "E2" => ParsedLabel::Recognized(ExposureLabel::E2),
            "E3" => ParsedLabel::Recognized(ExposureLabel::E3),
            _ => ParsedLabel::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExposureLabel::E0 => "E0",
            ExposureLabel::E1 => "E1",
            ExposureLabel::E2 => "E2",
            ExposureLabel::E3 => "E3",
        }
    }

    pub fn score(self, scheme: ExposureScheme) -> f64 {
        match (scheme, self) {
            (ExposureScheme::Alpha, ExposureLabel::E1) => 1.0,
            (ExposureScheme::Alpha, _) => 0.0,
            (ExposureScheme::Beta, ExposureLabel::E0) => 0.0,
            (ExposureScheme::Beta, ExposureLabel::E1) => 1.0,
            (ExposureScheme::Beta, ExposureLabel::E2 | ExposureLabel::E3) => 0.5,
            (ExposureScheme::Gamma, ExposureLabel::E0) => 0.0,
            (ExposureScheme::Gamma, _) => 1.0,
        }
    }
}

impl AutomationLabel {
    pub const ALL: [AutomationLabel; 5] = [
        AutomationLabel::T0,
        AutomationLabel::T1,
        AutomationLabel::T2,
        AutomationLabel::T3,
        AutomationLabel::T4,
    ];

    pub fn parse(raw: Option<&str>) -> ParsedLabel<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return ParsedLabel::Missing;
        };
        match raw.to_ascii_uppercase().as_str() {
            "T0" => ParsedLabel::Recognized(AutomationLabel::T0),
            "T1" => ParsedLabel::Recognized(AutomationLabel::T1),
            "T2" => ParsedLabel::Recognized(AutomationLabel::T2),
            "T3" => ParsedLabel::Recognized(AutomationLabel::T3),
            "T4" => ParsedLabel::Recognized(AutomationLabel::T4),
            _ => ParsedLabel::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationLabel::T0 => "T0",
            AutomationLabel::T1 => "T1",
            AutomationLabel::T2 => "T2",
            AutomationLabel::T3 => "T3",
            AutomationLabel::T4 => "T4",
        }
    }

    /// Evenly spaced on [0, 1]
    pub fn score(self) -> f64 {
        match self {
            AutomationLabel::T0 => 0.0,
            AutomationLabel::T1 => 0.25,
            AutomationLabel::T2 => 0.5,
            AutomationLabel::T3 => 0.75,
            AutomationLabel::T4 => 1.0,
        }
    }
}

impl fmt::Display for ExposureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AutomationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemes_are_monotonic_for_every_label() {
        for label in ExposureLabel::ALL {
            let alpha = label.score(ExposureScheme::Alpha);
            let beta = label.score(ExposureScheme::Beta);
            let gamma = label.score(ExposureScheme::Gamma);
            assert!(alpha <= beta && beta <= gamma, "{label}: {alpha} {beta} {gamma}");
        }
    }

    #[test]
    fn test_score_tables() {
        use ExposureLabel::*;
        let table = |scheme| ExposureLabel::ALL.map(|l| l.score(scheme));
        assert_eq!(table(ExposureScheme::Alpha), [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(table(ExposureScheme::Beta), [0.0, 1.0, 0.5, 0.5]);
        assert_eq!(table(ExposureScheme::Gamma), [0.0, 1.0, 1.0, 1.0]);
        assert_eq!(E3.score(ExposureScheme::Beta), 0.5);
    }

    #[test]
    fn test_parse_exposure_label() {
        assert_eq!(ExposureLabel::parse(Some(" e2 ")), ParsedLabel::Recognized(ExposureLabel::E2));
        assert_eq!(ExposureLabel::parse(None), ParsedLabel::Missing);
        assert_eq!(ExposureLabel::parse(Some("  ")), ParsedLabel::Missing);
        assert_eq!(
            ExposureLabel::parse(Some("E5")),
            ParsedLabel::Unrecognized("E5".to_string())
        );
    }

    #[test]
    fn test_automation_scores_evenly_spaced() {
        let scores = AutomationLabel::ALL.map(AutomationLabel::score);
        for pair in scores.windows(2) {
            assert!((pair[1] - pair[0] - 0.25).abs() < 1e-12);
        }
        assert_eq!(scores[0], 0.0);
        assert_eq!(scores[4], 1.0);
        assert_eq!(AutomationLabel::parse(Some("t3")), ParsedLabel::Recognized(AutomationLabel::T3));
    }

    #[test]
    fn test_display_matches_parse_input() {
        for label in ExposureLabel::ALL {
            assert_eq!(ExposureLabel::parse(Some(label.to_string().as_str())), ParsedLabel::Recognized(label));
        }
        for label in AutomationLabel::ALL {
            assert_eq!(AutomationLabel::parse(Some(label.to_string().as_str())), ParsedLabel::Recognized(label));
        }
        assert_eq!(ExposureLabel::E2.to_string(), "E2");
        assert_eq!(AutomationLabel::T4.to_string(), "T4");
    }
}
