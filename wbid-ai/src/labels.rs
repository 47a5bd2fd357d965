//! Class labels in model output order
//!
//! The labels file holds one raw class label per line (for example
//! `Anas_platyrhynchos`). Blank lines and lines starting with `#` are skipped.

use std::path::Path;

use tracing::info;
use wbid_common::names::{display_name, normalize_scientific_name};

use crate::classifier::Prediction;
use crate::error::{ClassifierError, Result};

#[derive(Debug, Clone)]
pub struct Labels {
    classes: Vec<String>,
}

impl Labels {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ClassifierError::Labels {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let labels = Self::parse(&content).map_err(|reason| ClassifierError::Labels {
            path: path.to_path_buf(),
            reason,
        })?;

        info!(count = labels.len(), path = %path.display(), "loaded class labels");
        Ok(labels)
    }

    /// Parse labels text; an error string when no label is present
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let classes: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        if classes.is_empty() {
            return Err("no class labels found".to_string());
        }
        Ok(Self { classes })
    }

    pub fn from_classes(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Build the prediction for class `index` with softmax probability `probability`
    pub fn prediction(&self, index: usize, probability: f32) -> Option<Prediction> {
        let raw = self.get(index)?;
        Some(Prediction {
            species: display_name(raw),
            scientific: normalize_scientific_name(raw),
            confidence: crate::postprocess::confidence_percent(probability),
        })
    }
}
