//! Error type shared by the tub reader, pilots, renderer and window.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, VisError>;

#[derive(Debug, thiserror::Error)]
pub enum VisError {
    /// Invalid option or config value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A snapshot, tub or image could not be loaded
    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Position {position} out of range for {count} records")]
    IndexOutOfRange { position: usize, count: usize },

    #[error("Record {record_id} has no field '{field}'")]
    MissingField { record_id: u64, field: String },

    #[error("Field '{field}' is not of type {expected}")]
    FieldType { field: String, expected: &'static str },

    #[error("Window error: {0}")]
    Window(String),

    /// The pilot produced output we cannot interpret
    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
}

impl VisError {
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
