use serde_json::{Map, Value};

use crate::features::FeatureKind;
use crate::schema::AnnotationResult;

pub mod faces;
pub mod image_properties;
pub mod labels;
pub mod objects;
pub mod polygon;
pub mod safe_search;
pub mod utils;

pub use faces::FaceNormalizer;
pub use image_properties::ImagePropertiesNormalizer;
pub use labels::LabelNormalizer;
pub use objects::ObjectNormalizer;
pub use safe_search::SafeSearchNormalizer;

/// Maps one raw payload section into its canonical field.
pub trait SectionNormalizer {
    fn name(&self) -> &'static str;
    fn feature(&self) -> FeatureKind;
    fn normalize(&self, payload: &RawPayload<'_>, out: &mut AnnotationResult) -> SectionOutcome;
}

/// What happened to a single section during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// None of the accepted keys were in the payload.
    Missing,
    /// A key was present but held the wrong JSON type.
    Mismatched { key: &'static str, found: &'static str },
    Parsed {
        key: &'static str,
        kept: usize,
        dropped: usize,
    },
}

/// Keyed view over a raw annotation response.
#[derive(Debug, Clone, Copy)]
pub struct RawPayload<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawPayload<'a> {
    /// `None` when the value is not a JSON object.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    pub fn fields(&self) -> &'a Map<String, Value> {
        self.fields
    }

    /// First of `keys` present in the payload. Keys may be dotted paths
    /// into nested objects, e.g. `objectDetectionResult.objectDetections`.
    pub fn first_present(&self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        keys.iter()
            .find_map(|key| utils::lookup_path(self.fields, key).map(|value| (*key, value)))
    }
}
