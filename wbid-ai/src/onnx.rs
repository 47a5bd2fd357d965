//! ONNX Runtime backend

use std::path::Path;
use std::sync::Mutex;

use image::DynamicImage;
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, info};

use crate::classifier::{Prediction, SpeciesClassifier};
use crate::error::{ClassifierError, Result};
use crate::labels::Labels;
use crate::postprocess::{softmax_with_temperature, top1};
use crate::preprocess::{preprocess, INPUT_SHAPE};

/// Image classifier backed by an exported ONNX model
///
/// `Session::run` needs exclusive access, so concurrent requests serialize
/// on the session lock.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    labels: Labels,
    temperature: f32,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path, labels_path: &Path, temperature: f32) -> Result<Self> {
        let model_err = |reason: String| ClassifierError::ModelLoad {
            path: model_path.to_path_buf(),
            reason,
        };

        if !model_path.exists() {
            return Err(model_err("file not found".to_string()));
        }
        let labels = Labels::load(labels_path)?;

        let session = Session::builder()
            .map_err(|e| model_err(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| model_err(e.to_string()))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| model_err("model declares no inputs".to_string()))?;

        info!(
            classes = labels.len(),
            input = %input_name,
            model = %model_path.display(),
            "loaded classification model"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            labels,
            temperature,
        })
    }

    fn logits(&self, input: Vec<f32>) -> Result<Vec<f32>> {
        let shape = INPUT_SHAPE.map(|d| d as i64);
        let tensor = Tensor::from_array((shape, input.into_boxed_slice()))
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let (output_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let dims: &[i64] = output_shape;
        let expected = self.labels.len();
        if dims.len() != 2 || dims[0] != 1 || dims[1] as usize != expected {
            return Err(ClassifierError::OutputShape {
                shape: dims.to_vec(),
                expected,
            });
        }
        Ok(data.to_vec())
    }
}

impl SpeciesClassifier for OnnxClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Prediction> {
        let logits = self.logits(preprocess(image))?;
        let probabilities = softmax_with_temperature(&logits, self.temperature);

        let (index, probability) = top1(&probabilities)
            .ok_or_else(|| ClassifierError::Inference("empty model output".to_string()))?;
        let prediction = self.labels.prediction(index, probability).ok_or(
            ClassifierError::OutputShape {
                shape: vec![1, probabilities.len() as i64],
                expected: self.labels.len(),
            },
        )?;

        debug!(
            species = %prediction.species,
            confidence = prediction.confidence,
            "classified image"
        );
        Ok(prediction)
    }

    fn class_count(&self) -> usize {
        self.labels.len()
    }
}
