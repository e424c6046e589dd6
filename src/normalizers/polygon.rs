use serde_json::{Map, Value};

use super::utils::finite_number;
use crate::schema::{Polygon, Vertex};

/// Read a detection region from whichever encoding the entry carries.
///
/// `keys` name the bounding-poly fields to try in order; the flat `box`
/// corner array and the pixel `boundingBox` rect are tried afterwards.
pub fn parse_region(entry: &Map<String, Value>, keys: &[&str]) -> Option<Polygon> {
    keys.iter()
        .filter_map(|key| entry.get(*key))
        .find_map(parse_bounding_poly)
        .or_else(|| entry.get("box").and_then(parse_box))
        .or_else(|| entry.get("boundingBox").and_then(parse_bounding_box))
}

/// `{normalizedVertices: [...], vertices: [...]}`. A form holding a full
/// quad wins, normalized first; otherwise whichever form has vertices.
/// Regions already in canonical `{space, vertices}` form are read as-is.
pub fn parse_bounding_poly(value: &Value) -> Option<Polygon> {
    let poly = value.as_object()?;
    if poly.contains_key("space") {
        return serde_json::from_value(value.clone()).ok();
    }
    let normalized = Polygon::Normalized(
        poly.get("normalizedVertices")
            .map(parse_vertices)
            .unwrap_or_default(),
    );
    let pixel = Polygon::Pixel(poly.get("vertices").map(parse_vertices).unwrap_or_default());
    if normalized.is_quad() {
        Some(normalized)
    } else if pixel.is_quad() {
        Some(pixel)
    } else if !normalized.vertices().is_empty() {
        Some(normalized)
    } else if !pixel.vertices().is_empty() {
        Some(pixel)
    } else {
        None
    }
}

/// Vertices with an absent coordinate are taken as 0, since the service
/// omits zero-valued fields. Vertices that are not objects, or whose
/// coordinates are not numbers, are skipped.
fn parse_vertices(value: &Value) -> Vec<Vertex> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let vertex = parse_vertex(item);
            if vertex.is_none() {
                log::warn!("skipping malformed vertex {}: {}", index, item);
            }
            vertex
        })
        .collect()
}

fn parse_vertex(item: &Value) -> Option<Vertex> {
    let point = item.as_object()?;
    let coord = |key: &str| match point.get(key) {
        None => Some(0.0),
        Some(_) => finite_number(point, &[key]),
    };
    Some(Vertex::new(coord("x")?, coord("y")?))
}

/// `[x0, y0, x1, y1]` normalized corners.
fn parse_box(value: &Value) -> Option<Polygon> {
    let corners: Vec<f64> = value
        .as_array()?
        .iter()
        .map(|n| n.as_f64().filter(|n| n.is_finite()))
        .collect::<Option<_>>()?;
    match corners.as_slice() {
        [x0, y0, x1, y1] => Some(Polygon::normalized_corners(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

/// `{x, y, width, height}` in pixels.
fn parse_bounding_box(value: &Value) -> Option<Polygon> {
    let rect = value.as_object()?;
    Some(Polygon::pixel_rect(
        finite_number(rect, &["x"])?,
        finite_number(rect, &["y"])?,
        finite_number(rect, &["width"])?,
        finite_number(rect, &["height"])?,
    ))
}
