//! Ingredient detection on photos.
//!
//! The detector itself is an external model behind [`IngredientDetector`];
//! this module only turns its raw output into per-label counts.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::job::AiJob;
use crate::result::AiError;

/// Default minimum confidence for a detected object to be counted.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f32,
}

/// Raw detector output for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub objects: Vec<DetectedObject>,
    /// Image with boxes drawn, when the detector renders one.
    #[serde(default)]
    pub annotated_image: Option<Vec<u8>>,
}

/// Object detector for ingredient photos.
///
/// Implementations may block (network or model inference); callers run them
/// off the async executor.
pub trait IngredientDetector: Send + Sync + 'static {
    fn detect(&self, image: &[u8]) -> Result<Detection, AiError>;
}

/// Count occurrences per label, ignoring objects under `min_confidence`.
pub fn count_labels(objects: &[DetectedObject], min_confidence: f32) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for obj in objects.iter().filter(|o| o.confidence >= min_confidence) {
        let label = obj.label.trim();
        if label.is_empty() {
            continue;
        }
        *counts.entry(label.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Counts plus the rendered image for one photo.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSummary {
    pub counts: BTreeMap<String, u32>,
    pub annotated_image: Option<Vec<u8>>,
}

pub struct DetectionJob {
    detector: Arc<dyn IngredientDetector>,
    image: Vec<u8>,
    min_confidence: f32,
}

impl DetectionJob {
    pub fn new(detector: Arc<dyn IngredientDetector>, image: Vec<u8>) -> Self {
        Self {
            detector,
            image,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

impl AiJob for DetectionJob {
    type Input = Vec<u8>;
    type Output = DetectionSummary;

    fn kind(&self) -> &'static str {
        "inventory.detection"
    }

    fn input(&self) -> &Self::Input {
        &self.image
    }

    fn run(&self) -> Result<Self::Output, AiError> {
        if self.image.is_empty() {
            return Err(AiError::InvalidInput("image is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(AiError::InvalidInput("min_confidence must be within [0, 1]".to_string()));
        }

        let detection = self.detector.detect(&self.image)?;
        Ok(DetectionSummary {
            counts: count_labels(&detection.objects, self.min_confidence),
            annotated_image: detection.annotated_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<(&'static str, f32)>);

    impl IngredientDetector for Fixed {
        fn detect(&self, _image: &[u8]) -> Result<Detection, AiError> {
            Ok(Detection {
                objects: self
                    .0
                    .iter()
                    .map(|(l, c)| DetectedObject {
                        label: l.to_string(),
                        confidence: *c,
                    })
                    .collect(),
                annotated_image: Some(vec![1, 2, 3]),
            })
        }
    }

    #[test]
    fn counts_per_label_above_threshold() {
        let objects = vec![
            DetectedObject { label: "corn".into(), confidence: 0.9 },
            DetectedObject { label: "corn".into(), confidence: 0.6 },
            DetectedObject { label: "tomato".into(), confidence: 0.1 },
            DetectedObject { label: " ".into(), confidence: 0.9 },
        ];
        let counts = count_labels(&objects, 0.25);
        assert_eq!(counts, BTreeMap::from([("corn".to_string(), 2)]));
    }

    #[test]
    fn job_runs_detector() {
        let detector: Arc<dyn IngredientDetector> = Arc::new(Fixed(vec![("egg", 0.8), ("egg", 0.7), ("milk", 0.5)]));
        let summary = DetectionJob::new(detector, vec![0xFF, 0xD8]).run().unwrap();
        assert_eq!(summary.counts["egg"], 2);
        assert_eq!(summary.counts["milk"], 1);
        assert_eq!(summary.annotated_image, Some(vec![1, 2, 3]));
    }

    #[test]
    fn decodes_detector_wire_format() {
        let d: Detection = serde_json::from_str(r#"{"objects":[{"label":"egg","confidence":0.8}]}"#).unwrap();
        assert_eq!(d.objects[0].label, "egg");
        assert_eq!(d.annotated_image, None);

        let d: Detection = serde_json::from_str(r#"{"objects":[],"annotated_image":[255,216]}"#).unwrap();
        assert_eq!(d.annotated_image, Some(vec![255, 216]));
    }

    #[test]
    fn empty_image_is_rejected() {
        let detector: Arc<dyn IngredientDetector> = Arc::new(Fixed(vec![]));
        let err = DetectionJob::new(detector, Vec::new()).run().unwrap_err();
        assert!(matches!(err, AiError::InvalidInput(_)));
    }
}
