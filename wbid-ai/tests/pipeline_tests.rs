//! End-to-end pipeline tests without a model runtime
//!
//! A toy classifier scores classes from the preprocessed tensor's channel
//! means, exercising preprocessing, temperature softmax, top-1 and label
//! formatting through the public API.

use image::{DynamicImage, Rgb, RgbImage};
use std::io::Write;
use tempfile::NamedTempFile;
use wbid_ai::postprocess::{softmax_with_temperature, top1};
use wbid_ai::preprocess::{preprocess, CROP_SIZE};
use wbid_ai::{Labels, Prediction, SpeciesClassifier};

/// Scores each class by the mean of one channel
struct ChannelClassifier {
    labels: Labels,
}

impl SpeciesClassifier for ChannelClassifier {
    fn classify(&self, image: &DynamicImage) -> wbid_ai::Result<Prediction> {
        let data = preprocess(image);
        let plane = (CROP_SIZE * CROP_SIZE) as usize;
        let logits: Vec<f32> = (0..3)
            .map(|c| data[c * plane..(c + 1) * plane].iter().sum::<f32>() / plane as f32)
            .collect();

        let probs = softmax_with_temperature(&logits, 1.3);
        let (index, p) = top1(&probs).unwrap();
        Ok(self.labels.prediction(index, p).unwrap())
    }

    fn class_count(&self) -> usize {
        self.labels.len()
    }
}

fn labels_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# red, green, blue").unwrap();
    writeln!(file, "Phoenicopterus_roseus").unwrap();
    writeln!(file, "Anas_platyrhynchos").unwrap();
    writeln!(file, "Cyanocitta_cristata").unwrap();
    file
}

#[test]
fn test_dominant_channel_wins() {
    let file = labels_file();
    let classifier = ChannelClassifier {
        labels: Labels::load(file.path()).unwrap(),
    };
    assert_eq!(classifier.class_count(), 3);

    let green = DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([10, 250, 10])));
    let prediction = classifier.classify(&green).unwrap();

    assert_eq!(prediction.species, "Anas Platyrhynchos");
    assert_eq!(prediction.scientific, "anas platyrhynchos");
    assert!(prediction.confidence > 33.34 && prediction.confidence <= 100.0);
}

#[test]
fn test_confidence_has_two_decimals() {
    let file = labels_file();
    let classifier = ChannelClassifier {
        labels: Labels::load(file.path()).unwrap(),
    };

    let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 200, Rgb([240, 30, 30])));
    let prediction = classifier.classify(&red).unwrap();
    assert_eq!(prediction.species, "Phoenicopterus Roseus");

    let scaled = prediction.confidence * 100.0;
    assert!((scaled - scaled.round()).abs() < 1e-6);
}
