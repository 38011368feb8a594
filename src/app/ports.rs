use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{IndustryEmploymentRecord, LaborRecord, TaskRecord};
use crate::manifest::{InputDigest, InputRole};

// Input-side ports
#[async_trait]
pub trait TableSourcePort: Send + Sync {
    async fn load_tasks(&self) -> Result<Vec<TaskRecord>>;

    /// `None` when no labor table is configured
    async fn load_labor(&self) -> Result<Option<Vec<LaborRecord>>>;

    /// `None` when no industry table is configured
    async fn load_industry(&self) -> Result<Option<Vec<IndustryEmploymentRecord>>>;

    /// Checksums of the configured inputs in `roles`, for the run manifest.
    /// Roles with no configured file are left out.
    async fn describe_inputs(&self, roles: &[InputRole]) -> Result<Vec<InputDigest>>;
}

// Output-side ports
#[async_trait]
pub trait ExposureOutputPort: Send + Sync {
    /// Write a table of rows; returns where it was written
    async fn write_table(&self, name: &str, rows: &[serde_json::Value]) -> Result<String>;

    /// Write a single JSON document; returns where it was written
    async fn write_document(&self, name: &str, document: &serde_json::Value) -> Result<String>;

    /// Write raw text under `file_name`; returns where it was written
    async fn write_text(&self, file_name: &str, contents: &str) -> Result<String>;
}
