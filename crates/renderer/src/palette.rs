//! Fixed colors for the viewer chrome and traces

use crate::surface::Rgba;

pub const BACKGROUND: Rgba = [18, 18, 24, 255];
pub const AXIS: Rgba = [200, 200, 210, 255];
pub const TICK_LABEL: Rgba = [160, 170, 200, 255];

pub const RAW_TRACE: Rgba = [100, 150, 255, 255];
pub const RECONSTRUCTED_TRACE: Rgba = [255, 200, 100, 255];
pub const RESIDUAL_TRACE: Rgba = [255, 100, 100, 255];
pub const CURSOR: Rgba = [220, 220, 255, 200];

/// Rotating per-channel palette for the multi-channel overlay.
pub const CHANNEL_COLORS: [Rgba; 8] = [
    [255, 100, 100, 255], // red
    [100, 200, 100, 255], // green
    [100, 150, 255, 255], // blue
    [255, 200, 100, 255], // orange
    [200, 100, 255, 255], // purple
    [100, 255, 255, 255], // cyan
    [255, 100, 200, 255], // pink
    [200, 200, 100, 255], // yellow
];

pub fn channel_color(channel: usize) -> Rgba {
    CHANNEL_COLORS[channel % CHANNEL_COLORS.len()]
}
