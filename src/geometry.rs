//! Placement of detection regions over the displayed image.
//!
//! Rectangles are expressed in percentages of the image box so they stay
//! aligned however the image is scaled on screen. Only axis-aligned quads
//! laid out clockwise from the top-left are understood; the mapping reads
//! vertex 0 as the top-left and vertex 2 as the bottom-right corner.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::{AnnotationResult, ImageDimensions, OverlayRect, Polygon};
use crate::selection::HighlightState;

/// Percentage rectangle for `polygon`, or `None` when it cannot be drawn yet.
///
/// Pixel polygons need known image dimensions. Polygons without exactly four
/// vertices never render. Negative sizes from unusual vertex ordering are
/// passed through unchanged.
pub fn to_overlay_rect(polygon: &Polygon, image: ImageDimensions) -> Option<OverlayRect> {
    let (scale_x, scale_y) = match polygon {
        Polygon::Normalized(_) => (1.0, 1.0),
        Polygon::Pixel(_) if image.is_known() => (image.width as f64, image.height as f64),
        Polygon::Pixel(_) => return None,
    };
    let [top_left, _, bottom_right, _] = polygon.vertices() else {
        return None;
    };

    let left = top_left.x / scale_x;
    let top = top_left.y / scale_y;
    let right = bottom_right.x / scale_x;
    let bottom = bottom_right.y / scale_y;
    Some(OverlayRect {
        top_percent: top * 100.0,
        left_percent: left * 100.0,
        width_percent: (right - left) * 100.0,
        height_percent: (bottom - top) * 100.0,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Object,
    Face,
}

/// One drawable box over the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverlayBox {
    pub kind: OverlayKind,
    /// Position of the detection within its list.
    pub index: usize,
    pub rect: OverlayRect,
    pub highlighted: bool,
}

/// Boxes for every renderable entry of one detection list.
///
/// Entries that cannot be placed are skipped, but indices still refer to
/// the entry's position in the list so they line up with the list view.
pub fn overlay_boxes<'a, I>(
    kind: OverlayKind,
    regions: I,
    image: ImageDimensions,
    highlight: HighlightState,
) -> Vec<OverlayBox>
where
    I: IntoIterator<Item = Option<&'a Polygon>>,
{
    regions
        .into_iter()
        .enumerate()
        .filter_map(|(index, region)| {
            let rect = to_overlay_rect(region?, image)?;
            Some(OverlayBox {
                kind,
                index,
                rect,
                highlighted: highlight.is_highlighted(index),
            })
        })
        .collect()
}

pub fn object_overlays(
    result: &AnnotationResult,
    image: ImageDimensions,
    highlight: HighlightState,
) -> Vec<OverlayBox> {
    overlay_boxes(
        OverlayKind::Object,
        result.objects().iter().map(|o| o.region.as_ref()),
        image,
        highlight,
    )
}

pub fn face_overlays(
    result: &AnnotationResult,
    image: ImageDimensions,
    highlight: HighlightState,
) -> Vec<OverlayBox> {
    overlay_boxes(
        OverlayKind::Face,
        result.faces().iter().map(|f| f.detection_region.as_ref()),
        image,
        highlight,
    )
}
