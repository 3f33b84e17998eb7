//! Selection cursor overlay
//!
//! The cursor lives on its own transparent surface layered above the worker's
//! frame and is repainted synchronously whenever the selection changes, so it
//! never waits on the throttled render protocol.

use ephys_charts_shared::AxisRange;

use crate::frame::PlotGeometry;
use crate::palette;
use crate::surface::{Surface, TRANSPARENT};

/// Repaint the overlay for the current selection. Clears to transparent when
/// nothing is selected or the selection is outside the visible range.
pub fn paint_cursor(
    surface: &mut Surface,
    geometry: &PlotGeometry,
    x_range: AxisRange,
    selected_index: Option<usize>,
) {
    surface.clear(TRANSPARENT);
    let Some(index) = selected_index else { return };
    let t = index as f64;
    if !x_range.contains(t) || x_range.span() <= 0.0 {
        return;
    }

    let plot = geometry.plot_rect();
    let px = geometry.margins.left as f64
        + (t - x_range.min) * geometry.drawable_width() / x_range.span();
    surface.vline(
        px.round() as i32,
        plot.y0,
        geometry.drawable_height() as u32 + 1,
        palette::CURSOR,
    );
}
