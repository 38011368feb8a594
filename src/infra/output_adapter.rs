use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::ports::ExposureOutputPort;
use crate::config::{OutputConfig, OutputFormat};

/// File-based implementation of ExposureOutputPort.
/// Tables go to `<dir>/<name>.ndjson` (or `.json` arrays), documents to
/// pretty-printed `<dir>/<name>.json`.
pub struct FileOutputAdapter {
    dir: PathBuf,
    format: OutputFormat,
}

impl FileOutputAdapter {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(output.dir.clone(), output.format)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_file(&self, file_name: &str, contents: &[u8]) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents).await?;
        Ok(path.display().to_string())
    }
}

fn render_ndjson(rows: &[Value]) -> serde_json::Result<String> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    Ok(out)
}

#[async_trait]
impl ExposureOutputPort for FileOutputAdapter {
    async fn write_table(&self, name: &str, rows: &[Value]) -> anyhow::Result<String> {
        let (file_name, contents) = match self.format {
            OutputFormat::Ndjson => (format!("{}.ndjson", name), render_ndjson(rows)?),
            OutputFormat::Json => (format!("{}.json", name), serde_json::to_string_pretty(rows)?),
        };
        let location = self.write_file(&file_name, contents.as_bytes()).await?;
        info!("Wrote {} rows to {}", rows.len(), location);
        Ok(location)
    }

    async fn write_document(&self, name: &str, document: &Value) -> anyhow::Result<String> {
        let contents = serde_json::to_string_pretty(document)?;
        self.write_file(&format!("{}.json", name), contents.as_bytes()).await
    }

    async fn write_text(&self, file_name: &str, contents: &str) -> anyhow::Result<String> {
        self.write_file(file_name, contents.as_bytes()).await
    }
}
