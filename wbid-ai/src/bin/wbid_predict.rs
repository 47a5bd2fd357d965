//! Single-image prediction utility
//!
//! Classifies one image with the configured model and prints the top-1
//! species, its probability and a coarse verdict.
//!
//! **Usage:**
//! ```bash
//! wbid-predict path/to/bird.jpg [--model model.onnx] [--labels labels.txt] [--threshold 0.8]
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;
use wbid_ai::{decode_image, OnnxClassifier, SpeciesClassifier};
use wbid_common::config::load_toml_config;

const KNOWN_VERDICT: &str = "KNOWN migratory bird";
const UNKNOWN_VERDICT: &str = "POTENTIAL NEW species (verification required)";

/// Plain softmax; the 0.80 threshold is calibrated against it
const UNTEMPERED: f32 = 1.0;

#[derive(Parser, Debug)]
#[clap(name = "wbid-predict")]
#[clap(about = "Classify a single bird image")]
struct Args {
    /// Image file to classify
    image: PathBuf,

    /// ONNX model file (defaults to [model] path in config)
    #[clap(long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Class labels file (defaults to [model] labels in config)
    #[clap(long, value_name = "FILE")]
    labels: Option<PathBuf>,

    /// Bootstrap config file
    #[clap(long, env = "WBID_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Probability at or above which the species counts as known
    #[clap(long, default_value = "0.80")]
    threshold: f64,

    /// Softmax temperature (defaults to 1.0; the service's [model]
    /// temperature is not applied here)
    #[clap(long)]
    temperature: Option<f32>,
}

fn effective_temperature(flag: Option<f32>) -> f32 {
    flag.unwrap_or(UNTEMPERED)
}

fn verdict(probability: f64, threshold: f64) -> &'static str {
    if probability >= threshold {
        KNOWN_VERDICT
    } else {
        UNKNOWN_VERDICT
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = load_toml_config(args.config.as_deref())?;

    let model = args
        .model
        .or(config.model.path)
        .ok_or_else(|| anyhow!("no model given; pass --model or set [model] path"))?;
    let labels = args
        .labels
        .or(config.model.labels)
        .ok_or_else(|| anyhow!("no labels given; pass --labels or set [model] labels"))?;
    let temperature = effective_temperature(args.temperature);

    let classifier = OnnxClassifier::load(&model, &labels, temperature)?;

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("reading {}", args.image.display()))?;
    let image = decode_image(&bytes)?;
    let prediction = classifier.classify(&image)?;
    info!(species = %prediction.species, "prediction complete");

    let probability = prediction.confidence / 100.0;
    println!("\n--- Prediction Result ---");
    println!("Predicted species : {}", prediction.species);
    println!("Confidence        : {:.3}", probability);
    println!("Status            : {}", verdict(probability, args.threshold));

    Ok(())
}
