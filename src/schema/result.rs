use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Likelihood, Polygon, SCHEMA_VERSION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectDetection {
    pub label: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Polygon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LabelDetection {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_region: Option<Polygon>,
    pub detection_confidence: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SafeSearchScores {
    pub adult: Likelihood,
    pub spoof: Likelihood,
    pub medical: Likelihood,
    pub violence: Likelihood,
    pub racy: Likelihood,
}

impl SafeSearchScores {
    /// Categories in display order.
    pub fn categories(&self) -> [(&'static str, Likelihood); 5] {
        [
            ("Adult", self.adult),
            ("Spoof", self.spoof),
            ("Medical", self.medical),
            ("Violence", self.violence),
            ("Racy", self.racy),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DominantColor {
    pub color: Rgb,
    pub pixel_fraction: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColorProfile {
    pub colors: Vec<DominantColor>,
}

/// Canonical result of one annotation request.
///
/// A section is `None` when its feature was not requested (or, for
/// safe-search and image properties, when the service returned nothing
/// usable). `Some(vec![])` means the feature was requested and nothing was
/// found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<ObjectDetection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<LabelDetection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faces: Option<Vec<FaceDetection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_search: Option<SafeSearchScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_properties: Option<ColorProfile>,
    pub version: String,
}

impl AnnotationResult {
    pub fn objects(&self) -> &[ObjectDetection] {
        self.objects.as_deref().unwrap_or_default()
    }

    pub fn labels(&self) -> &[LabelDetection] {
        self.labels.as_deref().unwrap_or_default()
    }

    pub fn faces(&self) -> &[FaceDetection] {
        self.faces.as_deref().unwrap_or_default()
    }
}

impl Default for AnnotationResult {
    fn default() -> Self {
        Self {
            objects: None,
            labels: None,
            faces: None,
            safe_search: None,
            image_properties: None,
            version: SCHEMA_VERSION.to_string(),
        }
    }
}
