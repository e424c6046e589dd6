pub mod config;
pub mod engine;
pub mod features;
pub mod geometry;
pub mod normalizers;
pub mod present;
pub mod schema;
pub mod selection;
pub mod session;

pub use engine::{NormalizationEngine, NormalizeError, normalize};
pub use features::{FeatureKind, FeatureSet};
pub use geometry::to_overlay_rect;
pub use schema::AnnotationResult;
pub use selection::{HighlightState, SelectionState, compute_highlight_state};
