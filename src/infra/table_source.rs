use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::app::ports::TableSourcePort;
use crate::config::InputConfig;
use crate::domain::{IndustryEmploymentRecord, LaborRecord, TaskRecord};
use crate::error::{ExposureError, Result};
use crate::manifest::{InputDigest, InputRole};

/// Reads input tables from JSON array (`.json`) or newline-delimited JSON files
pub struct JsonTableSource {
    tasks: PathBuf,
    labor: Option<PathBuf>,
    industry: Option<PathBuf>,
}

impl JsonTableSource {
    pub fn new(inputs: &InputConfig) -> Self {
        Self {
            tasks: inputs.tasks.clone(),
            labor: inputs.labor.clone(),
            industry: inputs.industry.clone(),
        }
    }

    fn path(&self, role: InputRole) -> Option<&Path> {
        match role {
            InputRole::Tasks => Some(self.tasks.as_path()),
            InputRole::Labor => self.labor.as_deref(),
            InputRole::Industry => self.industry.as_deref(),
        }
    }
}

/// Parse a table from raw bytes; a `.json` extension means one JSON array,
/// anything else is read as one JSON object per line
pub fn parse_rows<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<Vec<T>> {
    let is_array = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let input_error = |source: serde_json::Error| ExposureError::Input {
        path: path.display().to_string(),
        line: source.line(),
        source,
    };

    if is_array {
        return serde_json::from_slice(bytes).map_err(input_error);
    }

    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<T>()
        .map(|row| row.map_err(input_error))
        .collect()
}

async fn read_table<T: DeserializeOwned>(role: InputRole, path: &Path) -> Result<Vec<T>> {
    let table = role.as_str();
    debug!("Reading {} table from {}", table, path.display());
    let bytes = tokio::fs::read(path).await?;
    let rows: Vec<T> = parse_rows(path, &bytes)?;
    crate::observability::metrics::input::rows_loaded(table, rows.len());
    info!("Loaded {} {} rows from {}", rows.len(), table, path.display());
    Ok(rows)
}

#[async_trait]
impl TableSourcePort for JsonTableSource {
    async fn load_tasks(&self) -> anyhow::Result<Vec<TaskRecord>> {
        Ok(read_table(InputRole::Tasks, &self.tasks).await?)
    }

    async fn load_labor(&self) -> anyhow::Result<Option<Vec<LaborRecord>>> {
        match &self.labor {
            Some(path) => Ok(Some(read_table(InputRole::Labor, path).await?)),
            None => Ok(None),
        }
    }

    async fn load_industry(&self) -> anyhow::Result<Option<Vec<IndustryEmploymentRecord>>> {
        match &self.industry {
            Some(path) => Ok(Some(read_table(InputRole::Industry, path).await?)),
            None => Ok(None),
        }
    }

    async fn describe_inputs(&self, roles: &[InputRole]) -> anyhow::Result<Vec<InputDigest>> {
        let mut digests = Vec::new();
        for &role in roles {
            let Some(path) = self.path(role) else { continue };
            let bytes = tokio::fs::read(path).await?;
            digests.push(InputDigest::from_bytes(role, &path.display().to_string(), &bytes));
        }
        Ok(digests)
    }
}
