//! The trace viewer orchestrator
//!
//! Wires one (or, during comparison, two) data clients to the render worker:
//! user interaction updates the viewport state machine, `refresh` re-reads
//! the current state, fetches the visible window from every active client,
//! composites the series and hands the worker a render payload. Fetch
//! failures land in `last_error` and are shown inline; the viewer itself
//! stays interactive so the user can navigate away from a failing range.

use std::time::Duration;

use crossbeam_channel::Receiver;

use ephys_charts_data::ChunkedDataClient;
use ephys_charts_renderer::cursor;
use ephys_charts_renderer::{
    PlotGeometry, RenderEvent, RenderPayload, RenderWorker, SharedSurface, Surface, TraceSet,
};
use ephys_charts_shared::{
    AxisRange, ChartsError, ComparisonMode, DatasetMeta, ReconstructedInfo, Result,
};

use crate::comparison::{
    channel_view_for_comparison, compute_residuals, value_range, ChannelView, ComparisonState,
    MAX_OVERLAY_CHANNELS,
};
use crate::controls::{self, NavBar, ZoomDirection};
use crate::state::{reduce, ViewerAction, ViewerState};

const WORKER_STARTUP: Duration = Duration::from_secs(2);

pub struct TraceViewer {
    client: ChunkedDataClient,
    reconstructed_client: Option<ChunkedDataClient>,
    meta: DatasetMeta,
    state: ViewerState,
    comparison: ComparisonState,
    channel_view: ChannelView,
    geometry: PlotGeometry,
    worker: RenderWorker,
    surface: SharedSurface,
    /// Second pane used only for side-by-side comparison.
    side_panel: Option<(RenderWorker, SharedSurface)>,
    /// Transparent overlay holding the selection cursor.
    overlay: Surface,
    revision: u64,
    last_error: Option<ChartsError>,
}

impl TraceViewer {
    /// Initialize the data client and the render worker for one dataset.
    pub async fn open(
        metadata_url: impl Into<String>,
        data_url: impl Into<String>,
        geometry: PlotGeometry,
    ) -> Result<Self> {
        let mut client = ChunkedDataClient::new(metadata_url, data_url);
        let meta = client.initialize().await?;

        let (worker, surface) = spawn_panel(geometry)?;
        let overlay = Surface::new(geometry.width, geometry.height)?;

        let channel_view = if meta.num_channels == 1 {
            ChannelView::Single(0)
        } else if meta.num_channels <= MAX_OVERLAY_CHANNELS {
            ChannelView::All
        } else {
            ChannelView::Single(0)
        };

        Ok(Self {
            client,
            reconstructed_client: None,
            meta,
            state: ViewerState::initial(meta.shape),
            comparison: ComparisonState::default(),
            channel_view,
            geometry,
            worker,
            surface,
            side_panel: None,
            overlay,
            revision: 0,
            last_error: None,
        })
    }

    pub fn meta(&self) -> DatasetMeta {
        self.meta
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn comparison(&self) -> &ComparisonState {
        &self.comparison
    }

    pub fn channel_view(&self) -> ChannelView {
        self.channel_view
    }

    /// The worker-owned frame the embedding layer presents.
    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    /// The side-by-side pane's frame, when that mode is active.
    pub fn side_surface(&self) -> Option<&SharedSurface> {
        self.side_panel.as_ref().map(|(_, surface)| surface)
    }

    /// The cursor overlay layered above the frame.
    pub fn overlay(&self) -> &Surface {
        &self.overlay
    }

    pub fn worker_events(&self) -> &Receiver<RenderEvent> {
        self.worker.events()
    }

    pub fn last_error(&self) -> Option<&ChartsError> {
        self.last_error.as_ref()
    }

    /// Dispatch a state transition and keep the cursor overlay in sync.
    pub fn dispatch(&mut self, action: ViewerAction) {
        self.state = reduce(&self.state, action);
        cursor::paint_cursor(
            &mut self.overlay,
            &self.geometry,
            self.state.x_range,
            self.state.selected_index,
        );
    }

    pub fn pointer_down(&mut self, x_px: f64) {
        self.dispatch(ViewerAction::SetIsDragging(true));
        self.dispatch(ViewerAction::SetLastDragX(x_px));
    }

    pub fn pointer_move(&mut self, x_px: f64) {
        if !self.state.is_dragging {
            return;
        }
        let dx = x_px - self.state.last_drag_x;
        if let Some(range) = controls::pan_by_pixels(
            self.state.x_range,
            dx,
            self.geometry.drawable_width(),
            self.meta.shape,
        ) {
            self.dispatch(ViewerAction::SetXRange(range));
        }
        self.dispatch(ViewerAction::SetLastDragX(x_px));
    }

    pub fn pointer_up(&mut self) {
        self.dispatch(ViewerAction::SetIsDragging(false));
    }

    pub fn click(&mut self, x_px: f64) {
        if let Some(index) = controls::index_at_pixel(
            x_px,
            self.geometry.margins.left as f64,
            self.geometry.drawable_width(),
            self.state.x_range,
            self.meta.shape,
        ) {
            self.dispatch(ViewerAction::SetSelectedIndex(Some(index)));
        }
    }

    pub fn zoom_in(&mut self) {
        self.apply_zoom(ZoomDirection::In);
    }

    pub fn zoom_out(&mut self) {
        self.apply_zoom(ZoomDirection::Out);
    }

    fn apply_zoom(&mut self, direction: ZoomDirection) {
        let range = controls::zoom(
            self.state.x_range,
            self.state.selected_index,
            direction,
            self.meta.shape,
        );
        self.dispatch(ViewerAction::SetXRange(range));
    }

    /// Jump from a navigation-bar click.
    pub fn navigate_to(&mut self, nav: &NavBar, x_px: f64) {
        let range = nav.range_at_click(x_px, self.state.x_range);
        self.dispatch(ViewerAction::SetXRange(range));
    }

    /// Select (or clear) a lossy algorithm's reconstruction. Installs a
    /// fresh client over the reconstructed blob; the all-channels overlay
    /// falls back to channel 0 because reconstructions are per-channel.
    pub async fn select_algorithm(&mut self, info: Option<ReconstructedInfo>) -> Result<()> {
        match info {
            Some(info) => {
                let mut reconstructed = ChunkedDataClient::new(
                    info.dataset_json_url.as_str(),
                    info.reconstructed_url.as_str(),
                );
                reconstructed.initialize().await?;
                self.reconstructed_client = Some(reconstructed);
                self.channel_view = channel_view_for_comparison(self.channel_view);
                self.comparison.set_reconstructed(Some(info));
            }
            None => {
                self.reconstructed_client = None;
                self.comparison.set_reconstructed(None);
                self.side_panel = None;
            }
        }
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ComparisonMode) {
        self.comparison.set_mode(mode);
        if self.comparison.mode != ComparisonMode::SideBySide {
            self.side_panel = None;
        }
    }

    pub fn set_channel_view(&mut self, view: ChannelView) -> Result<()> {
        match view {
            ChannelView::Single(channel) if channel >= self.meta.num_channels => {
                Err(ChartsError::InvalidChannel {
                    channel,
                    num_channels: self.meta.num_channels,
                })
            }
            ChannelView::All if self.meta.num_channels > MAX_OVERLAY_CHANNELS => {
                Err(ChartsError::InvalidChannel {
                    channel: self.meta.num_channels,
                    num_channels: MAX_OVERLAY_CHANNELS,
                })
            }
            ChannelView::All if self.comparison.reconstructed.is_some() => {
                // Reconstructions are per-channel; keep the fallback.
                Ok(())
            }
            view => {
                self.channel_view = view;
                Ok(())
            }
        }
    }

    /// Build a payload for the current state and hand it to the worker.
    ///
    /// Always re-reads current state, so a stale fetch that resolved after a
    /// later viewport change can never paint the wrong window.
    pub async fn refresh(&mut self) -> Result<()> {
        let start = self.state.x_range.min.floor().max(0.0) as usize;
        let end = ((self.state.x_range.max.ceil() as usize) + 1).min(self.meta.shape);

        match self.build_payload(start, end).await {
            Ok(payload) => {
                if self.comparison.mode == ComparisonMode::SideBySide {
                    self.render_side_panel(&payload)?;
                }
                self.worker.render(payload);
                Ok(())
            }
            Err(error) => {
                log::warn!("error loading data range [{start}, {end}): {error}");
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    async fn build_payload(&mut self, start: usize, end: usize) -> Result<RenderPayload> {
        self.last_error = None;
        let time: Vec<f64> = (start..end).map(|t| t as f64).collect();

        let traces = match self.channel_view {
            ChannelView::All => {
                let buffers = futures::future::try_join_all(
                    (0..self.meta.num_channels).map(|c| self.client.fetch_range(start, end, c)),
                )
                .await?;
                TraceSet::MultiChannel {
                    channels: buffers.iter().map(|b| b.to_f64_vec()).collect(),
                }
            }
            ChannelView::Single(channel) => {
                let raw;
                let mut reconstructed = None;
                if let Some(recon_client) = &self.reconstructed_client {
                    let (raw_result, recon_result) = futures::join!(
                        self.client.fetch_range(start, end, channel),
                        recon_client.fetch_range(start, end, channel)
                    );
                    raw = raw_result?.to_f64_vec();
                    match recon_result {
                        Ok(buffer) => reconstructed = Some(buffer.to_f64_vec()),
                        Err(error) => {
                            // The raw trace is still shown; the overlay just
                            // misses its counterpart this pass.
                            log::warn!("reconstructed fetch failed: {error}");
                            self.last_error = Some(error);
                        }
                    }
                } else {
                    raw = self
                        .client
                        .fetch_range(start, end, channel)
                        .await?
                        .to_f64_vec();
                }
                let residuals = reconstructed
                    .as_deref()
                    .and_then(|recon| compute_residuals(&raw, recon));
                TraceSet::Single {
                    raw,
                    reconstructed,
                    residuals,
                }
            }
        };

        let mode = self.comparison.mode;
        let y_range = value_range(&traces, mode)
            .or_else(|| value_range(&traces, ComparisonMode::Original))
            .unwrap_or(AxisRange::new(-1.0, 1.0));

        self.revision += 1;
        Ok(RenderPayload {
            revision: self.revision,
            time,
            traces,
            mode,
            geometry: self.geometry,
            x_range: self.state.x_range,
            y_range,
        })
    }

    /// Second render pass for side-by-side: the reconstruction drawn alone
    /// over the same geometry and shared value range.
    fn render_side_panel(&mut self, payload: &RenderPayload) -> Result<()> {
        let TraceSet::Single {
            reconstructed: Some(reconstructed),
            ..
        } = &payload.traces
        else {
            return Ok(());
        };

        if self.side_panel.is_none() {
            self.side_panel = Some(spawn_panel(self.geometry)?);
        }
        let (worker, _) = self
            .side_panel
            .as_ref()
            .ok_or_else(|| ChartsError::RenderContext {
                message: "side panel unavailable".to_string(),
            })?;

        worker.render(RenderPayload {
            revision: payload.revision,
            time: payload.time.clone(),
            traces: TraceSet::Single {
                raw: reconstructed.clone(),
                reconstructed: None,
                residuals: None,
            },
            mode: payload.mode,
            geometry: payload.geometry,
            x_range: payload.x_range,
            y_range: payload.y_range,
        });
        Ok(())
    }
}

/// Spawn a render worker and run the initialize handshake.
fn spawn_panel(geometry: PlotGeometry) -> Result<(RenderWorker, SharedSurface)> {
    let worker = RenderWorker::spawn();
    worker.initialize(geometry.width, geometry.height);
    match worker.events().recv_timeout(WORKER_STARTUP) {
        Ok(RenderEvent::Initialized { surface }) => Ok((worker, surface)),
        Ok(RenderEvent::Error { error }) => Err(error),
        Ok(_) | Err(_) => Err(ChartsError::RenderContext {
            message: "render worker did not acknowledge initialization".to_string(),
        }),
    }
}
