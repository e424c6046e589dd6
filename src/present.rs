use crate::schema::{
    ColorProfile, DominantColor, FaceDetection, LabelDetection, ObjectDetection, Rgb,
    SafeSearchScores,
};

/// Anything a results table can rank by confidence.
pub trait Scored {
    fn confidence(&self) -> f64;
}

impl Scored for ObjectDetection {
    fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Scored for LabelDetection {
    fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Scored for FaceDetection {
    fn confidence(&self) -> f64 {
        self.detection_confidence
    }
}

/// Entries by descending confidence, each paired with its input index.
/// Equal confidences keep input order.
pub fn sort_by_confidence<T: Scored>(entries: &[T]) -> Vec<(usize, &T)> {
    let mut sorted: Vec<(usize, &T)> = entries.iter().enumerate().collect();
    sorted.sort_by(|(_, a), (_, b)| b.confidence().total_cmp(&a.confidence()));
    sorted
}

/// Input indices in the order rows are displayed. List rows and overlay
/// boxes are both numbered by position in this order.
pub fn display_order<T: Scored>(entries: &[T], sort: bool) -> Vec<usize> {
    if sort {
        sort_by_confidence(entries)
            .into_iter()
            .map(|(index, _)| index)
            .collect()
    } else {
        (0..entries.len()).collect()
    }
}

pub fn confidence_percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

/// Summary line for the highest-confidence object, if any.
pub fn top_result(objects: &[ObjectDetection]) -> Option<String> {
    let (_, best) = sort_by_confidence(objects).into_iter().next()?;
    Some(format!(
        "Image is classified as '{}' with {} confidence.",
        best.label,
        confidence_percent(best.confidence)
    ))
}

pub fn face_label(index: usize) -> String {
    format!("Face {}", index + 1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafeSearchRow {
    pub category: &'static str,
    pub level: &'static str,
    pub percent: f64,
}

pub fn safe_search_rows(scores: &SafeSearchScores) -> Vec<SafeSearchRow> {
    scores
        .categories()
        .into_iter()
        .map(|(category, likelihood)| SafeSearchRow {
            category,
            level: likelihood.label(),
            percent: likelihood.percent(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorRow {
    pub color: Rgb,
    pub rgb: String,
    pub percent: String,
    pub border: String,
}

const MAX_BORDER_BRIGHTNESS: f64 = 200.0;

fn perceived_brightness(color: &DominantColor) -> f64 {
    let c = color.color;
    (c.red as f64 * 299.0 + c.green as f64 * 587.0 + c.blue as f64 * 114.0) / 1000.0
}

fn color_row(color: &DominantColor) -> ColorRow {
    let c = color.color;
    let border = if perceived_brightness(color) > MAX_BORDER_BRIGHTNESS {
        "#BBBBBB".to_string()
    } else {
        format!("rgba({},{},{}, 0.8)", c.red, c.green, c.blue)
    };
    ColorRow {
        color: c,
        rgb: format!("RGB = ({}, {}, {})", c.red, c.green, c.blue),
        percent: confidence_percent(color.pixel_fraction),
        border,
    }
}

/// Colors by descending pixel fraction; ties keep input order.
pub fn color_rows(profile: &ColorProfile) -> Vec<ColorRow> {
    let mut colors: Vec<&DominantColor> = profile.colors.iter().collect();
    colors.sort_by(|a, b| b.pixel_fraction.total_cmp(&a.pixel_fraction));
    colors.into_iter().map(color_row).collect()
}
