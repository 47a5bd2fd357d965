//! Classifier error types

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassifierError>;

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Model file missing or rejected by the runtime
    #[error("Failed to load model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// Labels file missing, empty or unreadable
    #[error("Failed to load labels {path}: {reason}")]
    Labels { path: PathBuf, reason: String },

    /// Uploaded bytes are not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Runtime failure while executing the model
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Model output does not match the label count
    #[error("Unexpected model output shape {shape:?}, expected [1, {expected}]")]
    OutputShape { shape: Vec<i64>, expected: usize },
}
