//! Derived viewport operations: pan, zoom, select, navigation bar
//!
//! These sit on top of the state machine; each returns the range or index to
//! dispatch rather than mutating anything itself. All of them keep the
//! viewport inside `[0, shape - 1]`.

use ephys_charts_shared::AxisRange;

/// Per-step zoom factor for the in/out buttons. Buttons rather than the
/// wheel, so the page keeps its scroll.
pub const ZOOM_FACTOR: f64 = 1.5;

/// Narrowest range a zoom-in can produce.
const MIN_ZOOM_SPAN: f64 = 1.0;

/// Minimum navigation-marker width so it stays clickable when zoomed far in.
pub const MIN_NAV_MARKER_PX: f64 = 12.0;

/// Full data extent of a `shape`-timepoint dataset.
pub fn data_bounds(shape: usize) -> AxisRange {
    AxisRange::new(0.0, (shape.max(1) - 1) as f64)
}

/// Translate a drag by `dx_px` into a shifted range.
///
/// Returns `None` (caller no-ops) when the shift would push `min` below 0 or
/// `max` past `shape - 1`: panning stops dead at the edges instead of
/// sliding along them.
pub fn pan_by_pixels(
    x_range: AxisRange,
    dx_px: f64,
    drawable_width_px: f64,
    shape: usize,
) -> Option<AxisRange> {
    if drawable_width_px <= 0.0 || x_range.span() <= 0.0 {
        return None;
    }
    let scale = x_range.span() / drawable_width_px;
    // Dragging right pulls earlier timepoints into view.
    let shifted = x_range.shifted(-dx_px * scale);
    let bounds = data_bounds(shape);
    if shifted.min < bounds.min || shifted.max > bounds.max {
        return None;
    }
    Some(shifted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Scale the range by [`ZOOM_FACTOR`], centered on the selected timepoint if
/// one exists, else on the viewport midpoint; clamped to the data bounds.
pub fn zoom(
    x_range: AxisRange,
    selected_index: Option<usize>,
    direction: ZoomDirection,
    shape: usize,
) -> AxisRange {
    let center = selected_index
        .map(|i| i as f64)
        .unwrap_or_else(|| x_range.midpoint());
    let span = match direction {
        ZoomDirection::In => (x_range.span() / ZOOM_FACTOR).max(MIN_ZOOM_SPAN),
        ZoomDirection::Out => x_range.span() * ZOOM_FACTOR,
    };
    AxisRange::new(center - span / 2.0, center + span / 2.0).clamped_into(data_bounds(shape))
}

/// Map a pixel x inside the plot to a timepoint index.
pub fn index_at_pixel(
    x_px: f64,
    plot_left_px: f64,
    drawable_width_px: f64,
    x_range: AxisRange,
    shape: usize,
) -> Option<usize> {
    if drawable_width_px <= 0.0 {
        return None;
    }
    let frac = (x_px - plot_left_px) / drawable_width_px;
    let index = (x_range.min + frac * x_range.span()).round();
    (index >= 0.0 && index < shape as f64).then(|| index as usize)
}

/// Miniature full-extent control with a draggable/clickable marker showing
/// the current viewport.
#[derive(Debug, Clone, Copy)]
pub struct NavBar {
    pub width_px: f64,
    pub shape: usize,
}

impl NavBar {
    pub fn new(width_px: f64, shape: usize) -> Self {
        Self { width_px, shape }
    }

    fn px_per_timepoint(&self) -> f64 {
        self.width_px / data_bounds(self.shape).span().max(1.0)
    }

    /// Marker `(x, width)` in nav-bar pixels. Width never drops below
    /// [`MIN_NAV_MARKER_PX`] and the marker is kept inside the bar.
    pub fn marker(&self, x_range: AxisRange) -> (f64, f64) {
        let scale = self.px_per_timepoint();
        let width = (x_range.span() * scale).max(MIN_NAV_MARKER_PX.min(self.width_px));
        let mut x = x_range.min * scale;
        if x + width > self.width_px {
            x = self.width_px - width;
        }
        (x.max(0.0), width)
    }

    /// Re-center the viewport on a clicked nav-bar position, keeping the
    /// current span and clamping to the data bounds.
    pub fn range_at_click(&self, x_px: f64, current: AxisRange) -> AxisRange {
        let center = (x_px / self.width_px) * data_bounds(self.shape).span();
        let half = current.span() / 2.0;
        AxisRange::new(center - half, center + half).clamped_into(data_bounds(self.shape))
    }

    /// Follow a marker drag by `dx_px`, clamped to the data bounds.
    pub fn range_after_drag(&self, dx_px: f64, current: AxisRange) -> AxisRange {
        let delta = dx_px / self.px_per_timepoint();
        current.shifted(delta).clamped_into(data_bounds(self.shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_rejects_moves_past_bounds() {
        let range = AxisRange::new(0.0, 999.0);
        // Dragging right from the very start would push min below zero.
        assert_eq!(pan_by_pixels(range, 50.0, 600.0, 5000), None);

        // Dragging left moves forward in time.
        let panned = pan_by_pixels(range, -60.0, 600.0, 5000).unwrap();
        assert!((panned.min - 99.9).abs() < 1e-9);
        assert!((panned.max - 1098.9).abs() < 1e-9);

        // Near the tail, a further left drag is rejected.
        let tail = AxisRange::new(4000.0, 4999.0);
        assert_eq!(pan_by_pixels(tail, -10.0, 600.0, 5000), None);
    }

    #[test]
    fn test_pan_never_escapes_bounds_over_sequences() {
        let mut range = AxisRange::new(0.0, 999.0);
        let deltas = [-250.0, -250.0, 80.0, -400.0, 300.0, -1000.0, 500.0, -5.0];
        for _ in 0..20 {
            for dx in deltas {
                if let Some(next) = pan_by_pixels(range, dx, 600.0, 5000) {
                    range = next;
                }
                assert!(range.min >= 0.0);
                assert!(range.max <= 4999.0);
            }
        }
    }

    #[test]
    fn test_zoom_in_centers_on_selection() {
        // {0, 999} with the selection at 500: one zoom step keeps the
        // selection centered and shrinks the window by 1.5x.
        let zoomed = zoom(
            AxisRange::new(0.0, 999.0),
            Some(500),
            ZoomDirection::In,
            5000,
        );
        assert!((zoomed.min - 167.0).abs() < 1.0);
        assert!((zoomed.max - 833.0).abs() < 1.0);
    }

    #[test]
    fn test_zoom_out_clamps_to_bounds() {
        let zoomed = zoom(
            AxisRange::new(0.0, 999.0),
            None,
            ZoomDirection::Out,
            1200,
        );
        assert_eq!(zoomed, AxisRange::new(0.0, 1199.0));
    }

    #[test]
    fn test_zoom_without_selection_uses_midpoint() {
        let zoomed = zoom(
            AxisRange::new(1000.0, 2000.0),
            None,
            ZoomDirection::In,
            5000,
        );
        assert!((zoomed.midpoint() - 1500.0).abs() < 1e-9);
        assert!((zoomed.span() - 1000.0 / ZOOM_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_in_has_a_floor() {
        let tiny = zoom(
            AxisRange::new(500.0, 500.5),
            None,
            ZoomDirection::In,
            5000,
        );
        assert!(tiny.span() >= 1.0);
    }

    #[test]
    fn test_index_at_pixel() {
        let range = AxisRange::new(0.0, 999.0);
        assert_eq!(index_at_pixel(60.0, 60.0, 600.0, range, 5000), Some(0));
        assert_eq!(index_at_pixel(660.0, 60.0, 600.0, range, 5000), Some(999));
        assert_eq!(index_at_pixel(360.0, 60.0, 600.0, range, 5000), Some(500));
        // Left of the plot maps below zero.
        assert_eq!(index_at_pixel(0.0, 60.0, 600.0, range, 5000), None);
    }

    #[test]
    fn test_nav_marker_minimum_width() {
        let nav = NavBar::new(800.0, 1_000_000);
        let (_, width) = nav.marker(AxisRange::new(500.0, 540.0));
        assert_eq!(width, MIN_NAV_MARKER_PX);

        let (x, width) = nav.marker(AxisRange::new(999_900.0, 999_999.0));
        assert!(x + width <= 800.0);
    }

    #[test]
    fn test_nav_drag_follows_and_clamps() {
        let nav = NavBar::new(800.0, 5000);
        let current = AxisRange::new(2000.0, 2999.0);

        // 80 nav pixels is a tenth of the bar, so a tenth of the extent.
        let dragged = nav.range_after_drag(80.0, current);
        assert!((dragged.min - 2499.9).abs() < 0.1);
        assert!((dragged.span() - 999.0).abs() < 1e-9);

        let pinned = nav.range_after_drag(-800.0, current);
        assert_eq!(pinned.min, 0.0);
        assert!((pinned.span() - 999.0).abs() < 1e-9);
    }

    #[test]
    fn test_nav_click_recenters_and_clamps() {
        let nav = NavBar::new(800.0, 5000);
        let current = AxisRange::new(0.0, 999.0);

        let centered = nav.range_at_click(400.0, current);
        assert!((centered.midpoint() - 2499.5).abs() < 1.0);
        assert!((centered.span() - 999.0).abs() < 1e-9);

        let clamped = nav.range_at_click(0.0, current);
        assert_eq!(clamped.min, 0.0);

        let clamped = nav.range_at_click(800.0, current);
        assert_eq!(clamped.max, 4999.0);
    }
}
