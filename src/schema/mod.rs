pub mod geometry;
pub mod likelihood;
pub mod result;

// Re-export commonly used types
pub use geometry::{ImageDimensions, OverlayRect, Polygon, Vertex};
pub use likelihood::Likelihood;
pub use result::{
    AnnotationResult, ColorProfile, DominantColor, FaceDetection, LabelDetection,
    ObjectDetection, Rgb, SafeSearchScores,
};

pub const SCHEMA_VERSION: &str = "0.1.0";
