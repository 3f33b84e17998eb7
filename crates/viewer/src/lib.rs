//! Interactive time-series viewer
//!
//! Owns the viewport state machine, the derived pan/zoom/select operations,
//! the comparison compositor, and the [`TraceViewer`] orchestrator that wires
//! data clients to the render worker.

pub mod comparison;
pub mod controls;
pub mod state;
pub mod viewer;

pub use comparison::{
    channel_view_for_comparison, compute_residuals, value_range, ChannelView, ComparisonState,
    MAX_OVERLAY_CHANNELS,
};
pub use controls::{
    index_at_pixel, pan_by_pixels, zoom, NavBar, ZoomDirection, MIN_NAV_MARKER_PX, ZOOM_FACTOR,
};
pub use state::{reduce, ViewerAction, ViewerState};
pub use viewer::TraceViewer;
