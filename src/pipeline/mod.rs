// Exposure pipeline: processing stages and the run orchestrator

pub mod orchestrator;
pub mod processing;

pub use orchestrator::{Pipeline, PipelineResult, RunMode};
