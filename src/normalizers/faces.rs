use serde_json::{Map, Value};

use super::polygon::parse_region;
use super::utils::{confidence, json_type_name, parse_entries};
use super::{RawPayload, SectionNormalizer, SectionOutcome};
use crate::features::FeatureKind;
use crate::schema::{AnnotationResult, FaceDetection};

pub const FACE_KEYS: &[&str] = &["faceAnnotations", "faces"];

pub struct FaceNormalizer;

impl FaceNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FaceNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_face(entry: &Map<String, Value>) -> Option<FaceDetection> {
    Some(FaceDetection {
        detection_region: parse_region(entry, &["boundingPoly", "fdBoundingPoly", "detectionRegion"]),
        detection_confidence: confidence(entry, &["detectionConfidence", "confidence"])?,
    })
}

impl SectionNormalizer for FaceNormalizer {
    fn name(&self) -> &'static str {
        "faces"
    }

    fn feature(&self) -> FeatureKind {
        FeatureKind::FaceDetection
    }

    fn normalize(&self, payload: &RawPayload<'_>, out: &mut AnnotationResult) -> SectionOutcome {
        let Some((key, value)) = payload.first_present(FACE_KEYS) else {
            out.faces = Some(Vec::new());
            return SectionOutcome::Missing;
        };
        let Some(items) = value.as_array() else {
            out.faces = Some(Vec::new());
            return SectionOutcome::Mismatched {
                key,
                found: json_type_name(value),
            };
        };
        let (faces, dropped) = parse_entries(self.name(), items, parse_face);
        let kept = faces.len();
        out.faces = Some(faces);
        SectionOutcome::Parsed { key, kept, dropped }
    }
}
