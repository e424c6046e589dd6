use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which single detection, if any, is emphasized in both the list and the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", content = "index", rename_all = "lowercase")]
pub enum HighlightState {
    #[default]
    None,
    At(usize),
}

impl HighlightState {
    pub fn index(&self) -> Option<usize> {
        match self {
            HighlightState::None => None,
            HighlightState::At(index) => Some(*index),
        }
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        self.index() == Some(index)
    }
}

/// Bounds-checked highlight for a hovered row out of `total_count` rows.
pub fn compute_highlight_state(hovered: Option<usize>, total_count: usize) -> HighlightState {
    match hovered {
        Some(index) if index < total_count => HighlightState::At(index),
        _ => HighlightState::None,
    }
}

/// Hover-driven selection for one displayed result.
///
/// Hovering replaces any previous selection, leaving every row clears it,
/// and a replaced result (or a new image) forces it back to unselected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected(usize),
}

impl SelectionState {
    pub fn new() -> Self {
        Self::Unselected
    }

    pub fn hover(&mut self, index: usize) {
        *self = SelectionState::Selected(index);
    }

    pub fn unhover(&mut self) {
        *self = SelectionState::Unselected;
    }

    pub fn result_replaced(&mut self) {
        *self = SelectionState::Unselected;
    }

    pub fn selected(&self) -> Option<usize> {
        match self {
            SelectionState::Unselected => None,
            SelectionState::Selected(index) => Some(*index),
        }
    }

    pub fn highlight(&self, total_count: usize) -> HighlightState {
        compute_highlight_state(self.selected(), total_count)
    }
}
