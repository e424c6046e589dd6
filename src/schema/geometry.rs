use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Region of a detection, in exactly one coordinate space.
///
/// Quads are laid out clockwise from the top-left corner, so vertex 0 is the
/// top-left and vertex 2 the bottom-right of an axis-aligned box. A polygon
/// keeps whatever vertices the payload carried; one without exactly four is
/// kept for display purposes but never produces an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "space", content = "vertices", rename_all = "lowercase")]
pub enum Polygon {
    /// Absolute image pixel coordinates.
    Pixel(Vec<Vertex>),
    /// Coordinates in [0,1] relative to the image size.
    Normalized(Vec<Vertex>),
}

impl Polygon {
    pub fn vertices(&self) -> &[Vertex] {
        match self {
            Polygon::Pixel(v) | Polygon::Normalized(v) => v,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, Polygon::Normalized(_))
    }

    /// Four vertices is the only shape the overlay mapping understands.
    pub fn is_quad(&self) -> bool {
        self.vertices().len() == 4
    }

    /// Axis-aligned quad from a top-left corner and a size.
    pub fn pixel_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Polygon::Pixel(quad(x, y, x + width, y + height))
    }

    /// Axis-aligned quad from two normalized corners.
    pub fn normalized_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Polygon::Normalized(quad(x0, y0, x1, y1))
    }
}

fn quad(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Vertex> {
    vec![
        Vertex::new(x0, y0),
        Vertex::new(x1, y0),
        Vertex::new(x1, y1),
        Vertex::new(x0, y1),
    ]
}

/// CSS-percentage rectangle positioned relative to the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRect {
    pub top_percent: f64,
    pub left_percent: f64,
    pub width_percent: f64,
    pub height_percent: f64,
}

/// Natural pixel size of the image; zero means the metadata is not loaded yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
