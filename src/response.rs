use serde::Serialize;
use serde_json::Value;

use crate::model::Prediction;

pub const MODE_REAL: &str = "real-model";
pub const MODE_MOCK: &str = "mock-model";

/// Uniform response body for every predict endpoint, whether the value came
/// from the classifier or the mock generator. Optional fields are omitted
/// entirely when unset.
#[derive(Debug, Serialize)]
pub struct PredictionResult {
    pub label: String,
    pub confidence: f32,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl PredictionResult {
    pub fn from_prediction(prediction: Prediction, mode: &'static str) -> Self {
        PredictionResult {
            label: prediction.label,
            confidence: round2(prediction.score),
            mode,
            filename: None,
            source: None,
            input: None,
        }
    }

    pub fn with_filename(mut self, filename: String) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn with_source(mut self, source: String) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }
}

/// Confidence is always reported at two decimals.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(0.8765), 0.88);
        assert_eq!(round2(0.994), 0.99);
        assert_eq!(round2(0.8), 0.8);
    }

    #[test]
    fn confidence_is_rounded_on_construction() {
        let result = PredictionResult::from_prediction(
            Prediction {
                label: "fake".into(),
                score: 0.91234,
            },
            MODE_REAL,
        );
        assert_eq!(result.confidence, 0.91);
        assert_eq!(result.mode, "real-model");
    }

    #[test]
    fn unset_fields_are_omitted_from_json() {
        let result = PredictionResult::from_prediction(
            Prediction {
                label: "real".into(),
                score: 0.85,
            },
            MODE_MOCK,
        )
        .with_filename("selfie.png".into());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["filename"], json!("selfie.png"));
        assert!(value.get("source").is_none());
        assert!(value.get("input").is_none());
    }
}
