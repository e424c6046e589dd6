use serde_json::{Map, Value};

use super::polygon::parse_region;
use super::utils::{confidence, json_type_name, parse_entries, text};
use super::{RawPayload, SectionNormalizer, SectionOutcome};
use crate::features::FeatureKind;
use crate::schema::{AnnotationResult, ObjectDetection};

pub const OBJECT_KEYS: &[&str] = &[
    "localizedObjectAnnotations",
    "objectDetections",
    "objects",
    "objectDetectionResult.objectDetections",
];

pub struct ObjectNormalizer;

impl ObjectNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ObjectNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_object(entry: &Map<String, Value>) -> Option<ObjectDetection> {
    Some(ObjectDetection {
        label: text(entry, &["name", "label"]),
        confidence: confidence(entry, &["score", "confidence"])?,
        region: parse_region(entry, &["boundingPoly", "region"]),
    })
}

impl SectionNormalizer for ObjectNormalizer {
    fn name(&self) -> &'static str {
        "objects"
    }

    fn feature(&self) -> FeatureKind {
        FeatureKind::ObjectLocalization
    }

    fn normalize(&self, payload: &RawPayload<'_>, out: &mut AnnotationResult) -> SectionOutcome {
        let Some((key, value)) = payload.first_present(OBJECT_KEYS) else {
            out.objects = Some(Vec::new());
            return SectionOutcome::Missing;
        };
        let Some(items) = value.as_array() else {
            out.objects = Some(Vec::new());
            return SectionOutcome::Mismatched {
                key,
                found: json_type_name(value),
            };
        };
        let (objects, dropped) = parse_entries(self.name(), items, parse_object);
        let kept = objects.len();
        out.objects = Some(objects);
        SectionOutcome::Parsed { key, kept, dropped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Polygon;
    use serde_json::json;

    fn run(value: Value) -> (AnnotationResult, SectionOutcome) {
        let payload = RawPayload::from_value(&value).unwrap();
        let mut out = AnnotationResult::default();
        let outcome = ObjectNormalizer::new().normalize(&payload, &mut out);
        (out, outcome)
    }

    #[test]
    fn localized_object_annotations() {
        let (out, outcome) = run(json!({"localizedObjectAnnotations": [
            {"name": "Cat", "score": 0.92, "boundingPoly": {"normalizedVertices": [
                {"x": 0.1, "y": 0.2}, {"x": 0.6, "y": 0.2}, {"x": 0.6, "y": 0.8}, {"x": 0.1, "y": 0.8}
            ]}},
            {"name": "Dog", "score": 0.85}
        ]}));
        assert_eq!(
            outcome,
            SectionOutcome::Parsed {
                key: "localizedObjectAnnotations",
                kept: 2,
                dropped: 0
            }
        );
        let objects = out.objects();
        assert_eq!(objects[0].label, "Cat");
        assert!(objects[0].region.as_ref().unwrap().is_normalized());
        assert_eq!(objects[1].label, "Dog");
        assert_eq!(objects[1].region, None);
    }

    #[test]
    fn legacy_object_detection_result() {
        let (out, _) = run(json!({"objectDetectionResult": {"objectDetections": [
            {"label": "cat", "confidence": 0.92,
             "boundingBox": {"x": 100, "y": 200, "width": 50, "height": 100}}
        ]}}));
        let object = &out.objects()[0];
        assert_eq!(object.label, "cat");
        assert_eq!(object.confidence, 0.92);
        assert_eq!(
            object.region,
            Some(Polygon::pixel_rect(100.0, 200.0, 50.0, 100.0))
        );
    }

    #[test]
    fn entry_without_confidence_is_dropped() {
        let (out, outcome) = run(json!({"objects": [
            {"label": "a", "confidence": 0.3},
            {"label": "b"},
            {"label": "c", "confidence": "0.9"},
            {"label": "d", "confidence": 0.5}
        ]}));
        let labels: Vec<&str> = out.objects().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "d"]);
        assert_eq!(
            outcome,
            SectionOutcome::Parsed {
                key: "objects",
                kept: 2,
                dropped: 2
            }
        );
    }

    #[test]
    fn missing_section_is_empty_list() {
        let (out, outcome) = run(json!({}));
        assert_eq!(outcome, SectionOutcome::Missing);
        assert_eq!(out.objects, Some(Vec::new()));
    }

    #[test]
    fn non_array_section_is_empty_list() {
        let (out, outcome) = run(json!({"objects": {"label": "x"}}));
        assert_eq!(
            outcome,
            SectionOutcome::Mismatched {
                key: "objects",
                found: "object"
            }
        );
        assert_eq!(out.objects, Some(Vec::new()));
    }
}
