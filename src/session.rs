use std::sync::Arc;

use serde_json::Value;

use crate::engine::{NormalizationEngine, NormalizeError};
use crate::features::FeatureSet;
use crate::geometry::{OverlayBox, OverlayKind, overlay_boxes};
use crate::present;
use crate::schema::{AnnotationResult, ImageDimensions, Polygon};
use crate::selection::{HighlightState, SelectionState};

/// Where the displayed image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Upload { file_name: String },
    Uri(String),
    CloudStorage { bucket: String, object: String },
}

/// Handle for one issued annotation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    features: FeatureSet,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The response replaced the displayed result.
    Displayed(Arc<AnnotationResult>),
    /// A newer request was issued, or the image changed, before this one resolved.
    Stale,
}

/// State of the result display: latest result, image metadata and selection.
///
/// Only the most recently issued request may replace the displayed result;
/// older responses are dropped whatever order they arrive in.
///
/// Hover indices and overlay box indices are display rows: positions in
/// [`DisplaySession::display_order`], which is sorted by confidence unless
/// sorting is turned off.
pub struct DisplaySession {
    engine: NormalizationEngine,
    issued: u64,
    displayed: Option<Arc<AnnotationResult>>,
    source: Option<ImageSource>,
    dimensions: ImageDimensions,
    selection: SelectionState,
    overlay_kind: OverlayKind,
    sort_by_confidence: bool,
}

impl DisplaySession {
    pub fn new() -> Self {
        Self::with_engine(NormalizationEngine::standard())
    }

    pub fn with_engine(engine: NormalizationEngine) -> Self {
        Self {
            engine,
            issued: 0,
            displayed: None,
            source: None,
            dimensions: ImageDimensions::default(),
            selection: SelectionState::new(),
            overlay_kind: OverlayKind::Object,
            sort_by_confidence: true,
        }
    }

    pub fn begin_request(&mut self, features: FeatureSet) -> RequestTicket {
        self.issued += 1;
        RequestTicket {
            seq: self.issued,
            features,
        }
    }

    /// Normalize a resolved response if its ticket is still current.
    ///
    /// Stale responses are not normalized at all. A malformed current
    /// response returns the error and leaves the displayed result in place.
    pub fn complete(
        &mut self,
        ticket: &RequestTicket,
        raw: &Value,
    ) -> Result<Completion, NormalizeError> {
        if ticket.seq != self.issued {
            log::debug!(
                "discarding response for request {} (latest is {})",
                ticket.seq,
                self.issued
            );
            return Ok(Completion::Stale);
        }
        let result = Arc::new(self.engine.normalize(raw, &ticket.features)?);
        self.displayed = Some(Arc::clone(&result));
        self.selection.result_replaced();
        Ok(Completion::Displayed(result))
    }

    /// A new image clears the result and invalidates every in-flight request.
    pub fn set_image_source(&mut self, source: ImageSource) {
        self.issued += 1;
        self.source = Some(source);
        self.displayed = None;
        self.dimensions = ImageDimensions::default();
        self.selection.result_replaced();
    }

    pub fn set_image_dimensions(&mut self, dimensions: ImageDimensions) {
        self.dimensions = dimensions;
    }

    /// Choose whether overlays show objects or faces; selection refers to that list.
    pub fn show_overlays_for(&mut self, kind: OverlayKind) {
        if self.overlay_kind != kind {
            self.overlay_kind = kind;
            self.selection.unhover();
        }
    }

    /// Reordering rows invalidates the hovered row.
    pub fn set_sort_by_confidence(&mut self, sort: bool) {
        if self.sort_by_confidence != sort {
            self.sort_by_confidence = sort;
            self.selection.unhover();
        }
    }

    /// Hover the list row at `row` in display order.
    pub fn hover(&mut self, row: usize) {
        self.selection.hover(row);
    }

    pub fn unhover(&mut self) {
        self.selection.unhover();
    }

    pub fn result(&self) -> Option<&AnnotationResult> {
        self.displayed.as_deref()
    }

    pub fn image_source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn overlay_kind(&self) -> OverlayKind {
        self.overlay_kind
    }

    /// Input indices of the current overlay list, in display order.
    pub fn display_order(&self) -> Vec<usize> {
        let Some(result) = self.result() else {
            return Vec::new();
        };
        match self.overlay_kind {
            OverlayKind::Object => present::display_order(result.objects(), self.sort_by_confidence),
            OverlayKind::Face => present::display_order(result.faces(), self.sort_by_confidence),
        }
    }

    /// Highlighted display row.
    pub fn highlight(&self) -> HighlightState {
        let total = self.result().map_or(0, |result| match self.overlay_kind {
            OverlayKind::Object => result.objects().len(),
            OverlayKind::Face => result.faces().len(),
        });
        self.selection.highlight(total)
    }

    /// Overlay boxes indexed by display row, so row `i` of the list and
    /// box `i` are the same detection.
    pub fn overlays(&self) -> Vec<OverlayBox> {
        let Some(result) = self.result() else {
            return Vec::new();
        };
        let regions: Vec<Option<&Polygon>> = match self.overlay_kind {
            OverlayKind::Object => result.objects().iter().map(|o| o.region.as_ref()).collect(),
            OverlayKind::Face => result
                .faces()
                .iter()
                .map(|f| f.detection_region.as_ref())
                .collect(),
        };
        let rows = self
            .display_order()
            .into_iter()
            .map(|index| regions.get(index).copied().flatten());
        overlay_boxes(self.overlay_kind, rows, self.dimensions, self.highlight())
    }
}

impl Default for DisplaySession {
    fn default() -> Self {
        Self::new()
    }
}
