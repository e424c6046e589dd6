use serde_json::{Map, Value};

use super::utils::json_type_name;
use super::{RawPayload, SectionNormalizer, SectionOutcome};
use crate::features::FeatureKind;
use crate::schema::{AnnotationResult, Likelihood, SafeSearchScores};

pub const SAFE_SEARCH_KEYS: &[&str] = &["safeSearchAnnotation", "safeSearch"];

pub struct SafeSearchNormalizer;

impl SafeSearchNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SafeSearchNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Level 0-5 as an integer (`3` or `3.0`), or a likelihood name;
/// anything else is `Unknown`.
fn likelihood(fields: &Map<String, Value>, key: &str) -> (Likelihood, bool) {
    let parsed = match fields.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
            .and_then(Likelihood::from_level),
        Some(Value::String(s)) => Likelihood::from_name(s),
        _ => None,
    };
    match parsed {
        Some(level) => (level, true),
        None => (Likelihood::Unknown, false),
    }
}

impl SectionNormalizer for SafeSearchNormalizer {
    fn name(&self) -> &'static str {
        "safe_search"
    }

    fn feature(&self) -> FeatureKind {
        FeatureKind::SafeSearchDetection
    }

    fn normalize(&self, payload: &RawPayload<'_>, out: &mut AnnotationResult) -> SectionOutcome {
        let Some((key, value)) = payload.first_present(SAFE_SEARCH_KEYS) else {
            return SectionOutcome::Missing;
        };
        let Some(fields) = value.as_object() else {
            return SectionOutcome::Mismatched {
                key,
                found: json_type_name(value),
            };
        };

        let mut dropped = 0;
        let mut read = |category: &str| {
            let (level, recognized) = likelihood(fields, category);
            if !recognized {
                log::debug!("{}: '{}' unrecognized, using UNKNOWN", self.name(), category);
                dropped += 1;
            }
            level
        };
        let scores = SafeSearchScores {
            adult: read("adult"),
            spoof: read("spoof"),
            medical: read("medical"),
            violence: read("violence"),
            racy: read("racy"),
        };
        out.safe_search = Some(scores);
        SectionOutcome::Parsed {
            key,
            kept: 5 - dropped,
            dropped,
        }
    }
}
