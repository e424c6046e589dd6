use serde_json::{Map, Value};

use super::utils::{confidence, json_type_name, parse_entries, text};
use super::{RawPayload, SectionNormalizer, SectionOutcome};
use crate::features::FeatureKind;
use crate::schema::{AnnotationResult, LabelDetection};

pub const LABEL_KEYS: &[&str] = &["labelAnnotations", "labels", "labelDetectionResult"];

/// Label lists, or a `{label: confidence}` map as older responses sent.
pub struct LabelNormalizer;

impl LabelNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_label(entry: &Map<String, Value>) -> Option<LabelDetection> {
    Some(LabelDetection {
        label: text(entry, &["description", "label", "name"]),
        confidence: confidence(entry, &["score", "confidence"])?,
    })
}

fn parse_confidence_map(section: &str, map: &Map<String, Value>) -> (Vec<LabelDetection>, usize) {
    let mut kept = Vec::with_capacity(map.len());
    let mut dropped = 0;
    for (label, value) in map {
        match value.as_f64().filter(|n| n.is_finite()) {
            Some(n) => kept.push(LabelDetection {
                label: label.clone(),
                confidence: n.clamp(0.0, 1.0),
            }),
            None => {
                log::warn!("{}: dropping label '{}' without a numeric confidence", section, label);
                dropped += 1;
            }
        }
    }
    (kept, dropped)
}

impl SectionNormalizer for LabelNormalizer {
    fn name(&self) -> &'static str {
        "labels"
    }

    fn feature(&self) -> FeatureKind {
        FeatureKind::LabelDetection
    }

    fn normalize(&self, payload: &RawPayload<'_>, out: &mut AnnotationResult) -> SectionOutcome {
        let Some((key, value)) = payload.first_present(LABEL_KEYS) else {
            out.labels = Some(Vec::new());
            return SectionOutcome::Missing;
        };
        let (labels, dropped) = match value {
            Value::Array(items) => parse_entries(self.name(), items, parse_label),
            Value::Object(map) => parse_confidence_map(self.name(), map),
            other => {
                out.labels = Some(Vec::new());
                return SectionOutcome::Mismatched {
                    key,
                    found: json_type_name(other),
                };
            }
        };
        let kept = labels.len();
        out.labels = Some(labels);
        SectionOutcome::Parsed { key, kept, dropped }
    }
}
