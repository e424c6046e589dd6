use serde_json::Value;
use thiserror::Error;

use crate::features::{FeatureKind, FeatureSet};
use crate::normalizers::utils::json_type_name;
use crate::normalizers::{
    FaceNormalizer, ImagePropertiesNormalizer, LabelNormalizer, ObjectNormalizer, RawPayload,
    SafeSearchNormalizer, SectionNormalizer, SectionOutcome,
};
use crate::schema::AnnotationResult;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The response is not a keyed structure, so no feature can be recovered.
    #[error("malformed payload: expected a JSON object, found {found}")]
    MalformedPayload { found: &'static str },
    #[error("malformed payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Per-section outcomes of one normalization call, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub sections: Vec<(FeatureKind, SectionOutcome)>,
}

impl NormalizationReport {
    pub fn outcome(&self, feature: FeatureKind) -> Option<&SectionOutcome> {
        self.sections
            .iter()
            .find(|(kind, _)| *kind == feature)
            .map(|(_, outcome)| outcome)
    }

    pub fn dropped(&self) -> usize {
        self.sections
            .iter()
            .map(|(_, outcome)| match outcome {
                SectionOutcome::Parsed { dropped, .. } => *dropped,
                _ => 0,
            })
            .sum()
    }
}

pub struct NormalizationEngine {
    normalizers: Vec<Box<dyn SectionNormalizer>>,
}

impl NormalizationEngine {
    pub fn new() -> Self {
        Self {
            normalizers: Vec::new(),
        }
    }

    pub fn register<N: SectionNormalizer + 'static>(mut self, normalizer: N) -> Self {
        self.normalizers.push(Box::new(normalizer));
        self
    }

    /// Engine with a normalizer for every feature kind.
    pub fn standard() -> Self {
        Self::new()
            .register(ObjectNormalizer::new())
            .register(LabelNormalizer::new())
            .register(FaceNormalizer::new())
            .register(SafeSearchNormalizer::new())
            .register(ImagePropertiesNormalizer::new())
    }

    pub fn normalize(
        &self,
        raw: &Value,
        requested: &FeatureSet,
    ) -> Result<AnnotationResult, NormalizeError> {
        self.normalize_with_report(raw, requested)
            .map(|(result, _)| result)
    }

    /// Normalize and also return what happened to each requested section.
    /// Sections whose feature was not requested are skipped entirely.
    pub fn normalize_with_report(
        &self,
        raw: &Value,
        requested: &FeatureSet,
    ) -> Result<(AnnotationResult, NormalizationReport), NormalizeError> {
        let payload = RawPayload::from_value(raw).ok_or(NormalizeError::MalformedPayload {
            found: json_type_name(raw),
        })?;

        let mut result = AnnotationResult::default();
        let mut report = NormalizationReport::default();
        for normalizer in &self.normalizers {
            let feature = normalizer.feature();
            if !requested.contains(feature) {
                continue;
            }
            let outcome = normalizer.normalize(&payload, &mut result);
            match &outcome {
                SectionOutcome::Missing => {
                    log::debug!("{}: requested but absent from payload", normalizer.name())
                }
                SectionOutcome::Mismatched { key, found } => log::warn!(
                    "{}: '{}' holds {}, treating section as absent",
                    normalizer.name(),
                    key,
                    found
                ),
                SectionOutcome::Parsed { key, kept, dropped } => log::debug!(
                    "{}: parsed '{}' ({} kept, {} dropped)",
                    normalizer.name(),
                    key,
                    kept,
                    dropped
                ),
            }
            report.sections.push((feature, outcome));
        }
        Ok((result, report))
    }

    pub fn normalize_json(
        &self,
        text: &str,
        requested: &FeatureSet,
    ) -> Result<AnnotationResult, NormalizeError> {
        let raw: Value = serde_json::from_str(text)?;
        self.normalize(&raw, requested)
    }
}

impl Default for NormalizationEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Normalize `raw` with every standard section normalizer.
pub fn normalize(raw: &Value, requested: &FeatureSet) -> Result<AnnotationResult, NormalizeError> {
    NormalizationEngine::standard().normalize(raw, requested)
}
