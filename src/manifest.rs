use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use crate::pipeline::processing::aggregate::AggregationDiagnostics;
use crate::pipeline::processing::industry::IndustryDiagnostics;
use crate::pipeline::processing::merge::MergeDiagnostics;
use crate::pipeline::processing::score_mapper::MappingDiagnostics;

/// Hex-encoded SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Which input table a file feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRole {
    Tasks,
    Labor,
    Industry,
}

impl InputRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputRole::Tasks => "tasks",
            InputRole::Labor => "labor",
            InputRole::Industry => "industry",
        }
    }
}

/// Identity of one input table at the time it was read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigest {
    pub role: InputRole,
    pub path: String,
    pub sha256: String,
    pub bytes: u64,
}

impl InputDigest {
    pub fn from_bytes(role: InputRole, path: &str, bytes: &[u8]) -> Self {
        Self {
            role,
            path: path.to_string(),
            sha256: sha256_hex(bytes),
            bytes: bytes.len() as u64,
        }
    }
}

/// Record of a single pipeline run, written next to its outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub mode: String,
    pub config: Config,
    pub inputs: Vec<InputDigest>,
    pub mapping: MappingDiagnostics,
    pub aggregation: AggregationDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<IndustryDiagnostics>,
    pub outputs: Vec<String>,
}
