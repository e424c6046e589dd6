use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed ordinal likelihood scale used by safe-search scores.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Likelihood::Unknown),
            1 => Some(Likelihood::VeryUnlikely),
            2 => Some(Likelihood::Unlikely),
            3 => Some(Likelihood::Possible),
            4 => Some(Likelihood::Likely),
            5 => Some(Likelihood::VeryLikely),
            _ => None,
        }
    }

    /// Accepts `VERY_LIKELY`, `very likely` and similar spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "UNKNOWN" => Some(Likelihood::Unknown),
            "VERY_UNLIKELY" => Some(Likelihood::VeryUnlikely),
            "UNLIKELY" => Some(Likelihood::Unlikely),
            "POSSIBLE" => Some(Likelihood::Possible),
            "LIKELY" => Some(Likelihood::Likely),
            "VERY_LIKELY" => Some(Likelihood::VeryLikely),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Likelihood::Unknown => "UNKNOWN",
            Likelihood::VeryUnlikely => "VERY UNLIKELY",
            Likelihood::Unlikely => "UNLIKELY",
            Likelihood::Possible => "POSSIBLE",
            Likelihood::Likely => "LIKELY",
            Likelihood::VeryLikely => "VERY LIKELY",
        }
    }

    pub fn percent(&self) -> f64 {
        match self {
            Likelihood::Unknown | Likelihood::VeryUnlikely => 0.0,
            Likelihood::Unlikely => 25.0,
            Likelihood::Possible => 50.0,
            Likelihood::Likely => 75.0,
            Likelihood::VeryLikely => 100.0,
        }
    }
}
