//! Frame painting: axes, clipping, traces, ticks
//!
//! One [`RenderPayload`] fully describes a frame. The worker owns the
//! painting; everything here is synchronous and deterministic so it can also
//! be driven directly from tests.

use ephys_charts_shared::{AxisRange, ComparisonMode};

use crate::font;
use crate::palette;
use crate::surface::{ClipRect, Surface};
use crate::ticks;

const TICK_LEN: u32 = 4;
const Y_TICK_MIN_GAP_PX: f64 = 24.0;
const X_TICK_GAP_PAD_PX: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 60,
            right: 20,
            top: 20,
            bottom: 40,
        }
    }
}

/// Pixel dimensions and margins of one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotGeometry {
    pub width: u32,
    pub height: u32,
    pub margins: Margins,
}

impl PlotGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
        }
    }

    pub fn drawable_width(&self) -> f64 {
        (self.width.saturating_sub(self.margins.left + self.margins.right)) as f64
    }

    pub fn drawable_height(&self) -> f64 {
        (self.height.saturating_sub(self.margins.top + self.margins.bottom)) as f64
    }

    /// Plot interior, used as the scissor rect while tracing. Degenerate on
    /// surfaces smaller than the margins, which clips everything away.
    pub fn plot_rect(&self) -> ClipRect {
        ClipRect {
            x0: self.margins.left as i32,
            y0: self.margins.top as i32,
            x1: self.width.saturating_sub(self.margins.right) as i32,
            y1: self.height.saturating_sub(self.margins.bottom) as i32,
        }
    }
}

/// The series carried by one render request.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceSet {
    Single {
        raw: Vec<f64>,
        reconstructed: Option<Vec<f64>>,
        residuals: Option<Vec<f64>>,
    },
    MultiChannel {
        channels: Vec<Vec<f64>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPayload {
    /// Monotonic request tag, echoed in the completion acknowledgement.
    pub revision: u64,
    /// Time-axis value per sample, shared by every series in `traces`.
    pub time: Vec<f64>,
    pub traces: TraceSet,
    pub mode: ComparisonMode,
    pub geometry: PlotGeometry,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
}

fn x_to_px(t: f64, geometry: &PlotGeometry, x_range: AxisRange) -> f64 {
    geometry.margins.left as f64 + (t - x_range.min) * geometry.drawable_width() / x_range.span()
}

fn y_to_px(v: f64, geometry: &PlotGeometry, y_range: AxisRange) -> f64 {
    geometry.margins.top as f64 + geometry.drawable_height()
        - (v - y_range.min) * geometry.drawable_height() / y_range.span()
}

fn draw_series(
    surface: &mut Surface,
    payload: &RenderPayload,
    values: &[f64],
    color: crate::surface::Rgba,
) {
    let n = payload.time.len().min(values.len());
    if n < 2 || payload.x_range.span() <= 0.0 || payload.y_range.span() <= 0.0 {
        return;
    }
    let points: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            (
                x_to_px(payload.time[i], &payload.geometry, payload.x_range),
                y_to_px(values[i], &payload.geometry, payload.y_range),
            )
        })
        .collect();
    surface.polyline(&points, color);
}

/// Paint one complete frame.
pub fn paint(surface: &mut Surface, payload: &RenderPayload) {
    let geometry = &payload.geometry;

    surface.clear(palette::BACKGROUND);

    // Axis lines at the margin boundary.
    let plot = geometry.plot_rect();
    surface.vline(
        plot.x0,
        plot.y0,
        geometry.drawable_height() as u32 + 1,
        palette::AXIS,
    );
    surface.hline(
        plot.x0,
        plot.y1,
        geometry.drawable_width() as u32 + 1,
        palette::AXIS,
    );

    // Traces, clipped to the plot interior.
    surface.set_clip(plot);
    match &payload.traces {
        TraceSet::MultiChannel { channels } => {
            for (i, channel) in channels.iter().enumerate() {
                draw_series(surface, payload, channel, palette::channel_color(i));
            }
        }
        TraceSet::Single {
            raw,
            reconstructed,
            residuals,
        } => match payload.mode {
            ComparisonMode::Residuals => {
                if let Some(residuals) = residuals {
                    draw_series(surface, payload, residuals, palette::RESIDUAL_TRACE);
                }
            }
            ComparisonMode::Overlay => {
                draw_series(surface, payload, raw, palette::RAW_TRACE);
                if let Some(reconstructed) = reconstructed {
                    draw_series(
                        surface,
                        payload,
                        reconstructed,
                        palette::RECONSTRUCTED_TRACE,
                    );
                }
            }
            // Side-by-side passes arrive as two independent payloads, each
            // carrying a single series over its own geometry.
            ComparisonMode::Original | ComparisonMode::SideBySide => {
                draw_series(surface, payload, raw, palette::RAW_TRACE);
            }
        },
    }
    surface.clear_clip();

    draw_x_ticks(surface, payload);
    draw_y_ticks(surface, payload);
}

fn draw_x_ticks(surface: &mut Surface, payload: &RenderPayload) {
    let geometry = &payload.geometry;
    let plot = geometry.plot_rect();

    // Long integer timepoint labels need extra breathing room, so the gap is
    // derived from the widest label the range can produce.
    let widest = payload
        .x_range
        .max
        .abs()
        .max(payload.x_range.min.abs())
        .round();
    let est_label_px = font::text_width(&format!("{widest}")) as f64;
    let min_gap = est_label_px + X_TICK_GAP_PAD_PX;

    let interval = ticks::tick_interval(payload.x_range, geometry.drawable_width(), min_gap);
    for tick in ticks::tick_positions(payload.x_range, geometry.drawable_width(), min_gap) {
        let px = x_to_px(tick, geometry, payload.x_range).round() as i32;
        surface.vline(px, plot.y1, TICK_LEN, palette::AXIS);
        let label = ticks::format_tick(tick, interval);
        let lx = px - (font::text_width(&label) / 2) as i32;
        font::draw_text(
            surface,
            lx,
            plot.y1 + TICK_LEN as i32 + 2,
            &label,
            palette::TICK_LABEL,
        );
    }
}

fn draw_y_ticks(surface: &mut Surface, payload: &RenderPayload) {
    let geometry = &payload.geometry;
    let plot = geometry.plot_rect();

    let interval = ticks::tick_interval(
        payload.y_range,
        geometry.drawable_height(),
        Y_TICK_MIN_GAP_PX,
    );
    for tick in ticks::tick_positions(
        payload.y_range,
        geometry.drawable_height(),
        Y_TICK_MIN_GAP_PX,
    ) {
        let py = y_to_px(tick, geometry, payload.y_range).round() as i32;
        surface.hline(plot.x0 - TICK_LEN as i32, py, TICK_LEN, palette::AXIS);
        let label = ticks::format_tick(tick, interval);
        let lx = plot.x0 - TICK_LEN as i32 - 2 - font::text_width(&label) as i32;
        let ly = py - (font::CHAR_H / 2) as i32;
        font::draw_text(surface, lx, ly, &label, palette::TICK_LABEL);
    }
}
