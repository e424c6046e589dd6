use serde_json::{Map, Value};

use super::utils::{finite_number, json_type_name, lookup_path, parse_entries};
use super::{RawPayload, SectionNormalizer, SectionOutcome};
use crate::features::FeatureKind;
use crate::schema::{AnnotationResult, ColorProfile, DominantColor, Rgb};

pub const IMAGE_PROPERTIES_KEYS: &[&str] = &["imagePropertiesAnnotation", "imageProperties"];

pub struct ImagePropertiesNormalizer;

impl ImagePropertiesNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImagePropertiesNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn channel(color: &Map<String, Value>, key: &str) -> u8 {
    finite_number(color, &[key])
        .map(|n| n.round().clamp(0.0, 255.0) as u8)
        .unwrap_or(0)
}

fn parse_color(entry: &Map<String, Value>) -> Option<DominantColor> {
    let pixel_fraction = finite_number(entry, &["pixelFraction"])?.clamp(0.0, 1.0);
    let color = match entry.get("color").and_then(Value::as_object) {
        Some(c) => Rgb {
            red: channel(c, "red"),
            green: channel(c, "green"),
            blue: channel(c, "blue"),
        },
        None => Rgb::default(),
    };
    Some(DominantColor {
        color,
        pixel_fraction,
        score: finite_number(entry, &["score"]).unwrap_or(0.0),
    })
}

impl SectionNormalizer for ImagePropertiesNormalizer {
    fn name(&self) -> &'static str {
        "image_properties"
    }

    fn feature(&self) -> FeatureKind {
        FeatureKind::ImageProperties
    }

    fn normalize(&self, payload: &RawPayload<'_>, out: &mut AnnotationResult) -> SectionOutcome {
        let Some((key, value)) = payload.first_present(IMAGE_PROPERTIES_KEYS) else {
            return SectionOutcome::Missing;
        };
        let Some(section) = value.as_object() else {
            return SectionOutcome::Mismatched {
                key,
                found: json_type_name(value),
            };
        };
        let colors = lookup_path(section, "dominantColors.colors").or_else(|| section.get("colors"));
        let items: &[Value] = match colors {
            Some(Value::Array(items)) => items.as_slice(),
            Some(other) => {
                return SectionOutcome::Mismatched {
                    key,
                    found: json_type_name(other),
                };
            }
            None => &[],
        };
        let (colors, dropped) = parse_entries(self.name(), items, parse_color);
        let kept = colors.len();
        out.image_properties = Some(ColorProfile { colors });
        SectionOutcome::Parsed { key, kept, dropped }
    }
}
