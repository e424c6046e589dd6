use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Detection capability a caller may request from the annotation service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureKind {
    ObjectLocalization,
    LabelDetection,
    ImageProperties,
    SafeSearchDetection,
    FaceDetection,
}

pub const ALL_FEATURES: &[FeatureKind] = &[
    FeatureKind::ObjectLocalization,
    FeatureKind::LabelDetection,
    FeatureKind::ImageProperties,
    FeatureKind::SafeSearchDetection,
    FeatureKind::FaceDetection,
];

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::ObjectLocalization => "OBJECT_LOCALIZATION",
            FeatureKind::LabelDetection => "LABEL_DETECTION",
            FeatureKind::ImageProperties => "IMAGE_PROPERTIES",
            FeatureKind::SafeSearchDetection => "SAFE_SEARCH_DETECTION",
            FeatureKind::FaceDetection => "FACE_DETECTION",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeatureKind::ObjectLocalization => "Object localization",
            FeatureKind::LabelDetection => "Label detection",
            FeatureKind::ImageProperties => "Image properties",
            FeatureKind::SafeSearchDetection => "Safe-search detection",
            FeatureKind::FaceDetection => "Face detection",
        }
    }

    /// List-shaped features normalize to an empty list when their raw field is missing.
    pub fn is_list_shaped(&self) -> bool {
        !matches!(
            self,
            FeatureKind::ImageProperties | FeatureKind::SafeSearchDetection
        )
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FeatureParseError {
    #[error("unknown feature: {0}")]
    Unknown(String),
    #[error("empty feature list")]
    Empty,
}

impl FromStr for FeatureKind {
    type Err = FeatureParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let token = input.trim().to_ascii_uppercase().replace('-', "_");
        match token.as_str() {
            "OBJECT_LOCALIZATION" | "OBJECTS" => Ok(FeatureKind::ObjectLocalization),
            "LABEL_DETECTION" | "LABELS" => Ok(FeatureKind::LabelDetection),
            "IMAGE_PROPERTIES" | "PROPERTIES" => Ok(FeatureKind::ImageProperties),
            "SAFE_SEARCH_DETECTION" | "SAFE_SEARCH" => Ok(FeatureKind::SafeSearchDetection),
            "FACE_DETECTION" | "FACES" => Ok(FeatureKind::FaceDetection),
            _ => Err(FeatureParseError::Unknown(input.trim().to_string())),
        }
    }
}

/// The set of features requested for one annotation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FeatureSet(BTreeSet<FeatureKind>);

impl FeatureSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn all() -> Self {
        ALL_FEATURES.iter().copied().collect()
    }

    pub fn with(mut self, feature: FeatureKind) -> Self {
        self.0.insert(feature);
        self
    }

    pub fn contains(&self, feature: FeatureKind) -> bool {
        self.0.contains(&feature)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FeatureKind> + '_ {
        self.0.iter().copied()
    }

    /// Parse a comma-separated list such as `objects,LABEL_DETECTION`.
    pub fn parse_list(input: &str) -> Result<Self, FeatureParseError> {
        let tokens: Vec<&str> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(FeatureParseError::Empty);
        }
        tokens.into_iter().map(FeatureKind::from_str).collect()
    }
}

impl FromIterator<FeatureKind> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = FeatureKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(FeatureKind::as_str).collect();
        f.write_str(&names.join(","))
    }
}
