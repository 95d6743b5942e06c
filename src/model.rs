use std::fs::File;
use std::io::Read;
use std::path::Path;

use image::DynamicImage;
use rand::Rng;
use tensorflow::{Graph, ImportGraphDefOptions, Session, SessionOptions, SessionRunArgs, Tensor};
use thiserror::Error;

/// The two categories every prediction resolves to, in model output order.
pub const LABELS: [&str; 2] = ["real", "fake"];

pub const MOCK_CONFIDENCE_MIN: f32 = 0.80;
pub const MOCK_CONFIDENCE_MAX: f32 = 0.99;

const INPUT_SIZE: u32 = 224;
const INPUT_OP: &str = "x";
const OUTPUT_OP: &str = "Identity";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("tensorflow error: {0}")]
    Tensorflow(#[from] tensorflow::Status),
    #[error("invalid operation name: {0}")]
    InvalidOperationName(#[from] std::ffi::NulError),
    #[error("{0}")]
    Graph(String),
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Classification capability selected once at startup. Handlers match on the
/// variant, so mock mode cannot accidentally reach a classifier call.
pub enum Backend {
    Local(Classifier),
    Mock,
}

impl Backend {
    /// Decides the serving mode for the life of the process. A missing or
    /// unloadable model is never fatal; the service degrades to mock.
    pub fn init(model_path: &str) -> Backend {
        if !Path::new(model_path).exists() {
            log::info!("No model found at {}, serving mock predictions", model_path);
            return Backend::Mock;
        }

        match Classifier::load(model_path) {
            Ok(classifier) => {
                log::info!("Loaded local model from {}", model_path);
                Backend::Local(classifier)
            }
            Err(err) => {
                log::error!(
                    "Failed to load model from {}: {}, falling back to mock",
                    model_path,
                    err
                );
                Backend::Mock
            }
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Backend::Local(_) => "local",
            Backend::Mock => "mock",
        }
    }
}

pub struct Classifier {
    session: Session,
    graph: Graph,
}

impl Classifier {
    pub fn load(model_path: &str) -> Result<Self, ModelError> {
        let mut graph = Graph::new();
        let mut model_file = File::open(model_path)?;
        let mut model_bytes = Vec::new();
        model_file.read_to_end(&mut model_bytes)?;

        graph.import_graph_def(&model_bytes, &ImportGraphDefOptions::new())?;
        let session = Session::new(&SessionOptions::new(), &graph)?;

        Ok(Classifier { session, graph })
    }

    fn preprocess(&self, image: &DynamicImage) -> Tensor<f32> {
        let resized = image
            .resize_exact(INPUT_SIZE, INPUT_SIZE, image::imageops::FilterType::Lanczos3)
            .to_rgb8();

        let mut flat = Vec::with_capacity((INPUT_SIZE * INPUT_SIZE * 3) as usize);
        for pixel in resized.pixels() {
            flat.push(pixel[0] as f32 / 255.0);
            flat.push(pixel[1] as f32 / 255.0);
            flat.push(pixel[2] as f32 / 255.0);
        }

        let mut tensor = Tensor::new(&[1, INPUT_SIZE as u64, INPUT_SIZE as u64, 3]);
        tensor.copy_from_slice(&flat);
        tensor
    }

    /// Runs the model on a decoded image and returns label/score pairs sorted
    /// by descending score. Callers treat the first entry as authoritative.
    pub fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ModelError> {
        let input_tensor = self.preprocess(image);

        let mut args = SessionRunArgs::new();

        let input_operation = self
            .graph
            .operation_by_name(INPUT_OP)?
            .ok_or_else(|| ModelError::Graph(format!("input operation {:?} not found", INPUT_OP)))?;
        let output_operation = self.graph.operation_by_name(OUTPUT_OP)?.ok_or_else(|| {
            ModelError::Graph(format!("output operation {:?} not found", OUTPUT_OP))
        })?;

        args.add_feed(&input_operation, 0, &input_tensor);
        let output_token = args.request_fetch(&output_operation, 0);
        self.session.run(&mut args)?;

        let output_tensor: Tensor<f32> = args.fetch(output_token)?;
        let scores: Vec<f32> = output_tensor.to_vec();

        let mut predictions: Vec<Prediction> = LABELS
            .iter()
            .zip(scores)
            .map(|(label, score)| Prediction {
                label: (*label).to_string(),
                score,
            })
            .collect();

        predictions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(predictions)
    }
}

/// Synthesizes a prediction when no real backend is involved. Label is a coin
/// flip over the two categories, score is uniform in the high-confidence band.
pub fn mock_prediction() -> Prediction {
    let mut rng = rand::rng();
    let label = if rng.random_bool(0.5) {
        LABELS[0]
    } else {
        LABELS[1]
    };

    Prediction {
        label: label.to_string(),
        score: rng.random_range(MOCK_CONFIDENCE_MIN..=MOCK_CONFIDENCE_MAX),
    }
}
