// Exposure processing stages: label scoring, task weighting, occupation
// aggregation, labor-market merge, and downstream reductions

pub mod labels;
pub mod score_mapper;
pub mod weighting;
pub mod aggregate;
pub mod merge;
pub mod industry;
pub mod summary;
pub mod coverage;

pub use aggregate::{OccupationAggregator, OccupationGrouping, WeightedMean};
pub use merge::LaborMarketMerger;
pub use score_mapper::{DefaultScoreMapper, MissingPolicy, ScoreMapper, ScoredTask};
pub use weighting::WeightScheme;
