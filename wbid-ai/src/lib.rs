//! Species image classifier
//!
//! A thin load-and-call wrapper around a pretrained image classification
//! model: ImageNet-style preprocessing, temperature-scaled softmax, top-1
//! class. The model itself is opaque; callers see the [`SpeciesClassifier`]
//! trait and a [`Prediction`].
//!
//! The ONNX Runtime backend lives behind the `onnx` feature.

pub mod classifier;
pub mod error;
pub mod labels;
pub mod postprocess;
pub mod preprocess;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

pub use classifier::{decode_image, Prediction, SpeciesClassifier};
pub use error::{ClassifierError, Result};
pub use labels::Labels;
