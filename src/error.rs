use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExposureError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed row in {path} at line {line}: {source}")]
    Input {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unrecognized {kind} label '{label}' on task {task_id} ({occupation_code})")]
    UnrecognizedLabel {
        kind: &'static str,
        label: String,
        task_id: String,
        occupation_code: String,
    },

    #[error("Invalid occupation code '{code}' on task {task_id}")]
    InvalidOccupationCode { code: String, task_id: String },
}

pub type Result<T> = std::result::Result<T, ExposureError>;
