//! Viewport state machine
//!
//! The viewer's interactive state is a small record mutated only through
//! [`reduce`], a pure transition function over tagged actions. Callers are
//! responsible for clamping ranges before dispatching `SetXRange`; the
//! reducer replaces fields wholesale and never rejects.

use ephys_charts_shared::AxisRange;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    /// Currently selected timepoint, if any.
    pub selected_index: Option<usize>,
    pub is_dragging: bool,
    /// Pixel x of the last observed drag position.
    pub last_drag_x: f64,
    /// Visible timepoint window.
    pub x_range: AxisRange,
}

impl ViewerState {
    /// Initial state for a dataset: up to the first 1000 timepoints visible,
    /// nothing selected, not dragging.
    pub fn initial(shape: usize) -> Self {
        Self {
            selected_index: None,
            is_dragging: false,
            last_drag_x: 0.0,
            x_range: AxisRange::new(0.0, 999.0_f64.min((shape - 1) as f64)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerAction {
    SetXRange(AxisRange),
    SetIsDragging(bool),
    SetLastDragX(f64),
    SetSelectedIndex(Option<usize>),
}

/// Pure state transition.
pub fn reduce(state: &ViewerState, action: ViewerAction) -> ViewerState {
    let mut next = state.clone();
    match action {
        ViewerAction::SetXRange(range) => next.x_range = range,
        ViewerAction::SetIsDragging(dragging) => next.is_dragging = dragging,
        ViewerAction::SetLastDragX(x) => next.last_drag_x = x,
        ViewerAction::SetSelectedIndex(index) => next.selected_index = index,
    }
    next
}
