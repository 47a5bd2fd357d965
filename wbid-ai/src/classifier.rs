//! Classifier seam
//!
//! The web layer holds an `Arc<dyn SpeciesClassifier>` and never learns which
//! backend produced a prediction. Tests substitute a fixed implementation.

use image::DynamicImage;
use serde::Serialize;

use crate::error::{ClassifierError, Result};

/// Top-1 classification result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Display name, e.g. "Anas Platyrhynchos"
    pub species: String,
    /// Normalized scientific name used for catalog lookup
    pub scientific: String,
    /// Percentage in [0, 100], rounded to two decimals
    pub confidence: f64,
}

pub trait SpeciesClassifier: Send + Sync {
    /// Classify one decoded image
    ///
    /// Blocking and CPU-bound; async callers run it on a blocking thread.
    fn classify(&self, image: &DynamicImage) -> Result<Prediction>;

    /// Number of classes the model distinguishes
    fn class_count(&self) -> usize;
}

/// Decode uploaded bytes, sniffing the format from content
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes).map_err(|e| ClassifierError::Decode(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ClassifierError::Decode("image has zero size".to_string()));
    }
    Ok(image)
}
