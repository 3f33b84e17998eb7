//! Off-main-thread rendering for the ephys-charts viewer
//!
//! The controller talks to a dedicated render thread through a strict
//! request/acknowledge message protocol ([`worker`]). The thread paints axes,
//! tick marks and one or more time-series traces onto a CPU framebuffer
//! ([`surface`]) shared with the controller. The selection cursor lives on a
//! separate transparent overlay ([`cursor`]) outside the throttled protocol.

pub mod cursor;
pub mod font;
pub mod frame;
pub mod palette;
pub mod surface;
pub mod ticks;
pub mod worker;

pub use frame::{Margins, PlotGeometry, RenderPayload, TraceSet};
pub use surface::{ClipRect, Rgba, Surface};
pub use worker::{RenderCommand, RenderEvent, RenderWorker, SharedSurface, RENDER_THROTTLE};
