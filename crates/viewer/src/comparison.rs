//! Comparison compositing: residual derivation, value ranges, channel rules

use ephys_charts_renderer::TraceSet;
use ephys_charts_shared::{AxisRange, ComparisonMode, ReconstructedInfo};

/// Most channels the all-channels overlay will draw at once.
pub const MAX_OVERLAY_CHANNELS: usize = 20;

/// Which channel(s) the viewer is displaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelView {
    /// Every channel overlaid (only offered for small channel counts).
    All,
    Single(usize),
}

/// Comparison selection state. Clearing the reconstruction forces the mode
/// back to plain original viewing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonState {
    pub mode: ComparisonMode,
    pub reconstructed: Option<ReconstructedInfo>,
}

impl ComparisonState {
    pub fn set_reconstructed(&mut self, info: Option<ReconstructedInfo>) {
        self.reconstructed = info;
        if self.reconstructed.is_none() {
            self.mode = ComparisonMode::Original;
        }
    }

    /// Comparison modes are only reachable while a reconstruction is loaded.
    pub fn set_mode(&mut self, mode: ComparisonMode) {
        if mode == ComparisonMode::Original || self.reconstructed.is_some() {
            self.mode = mode;
        } else {
            log::warn!("ignoring {mode:?}: no reconstruction selected");
        }
    }
}

/// Point-wise `original - reconstructed`.
///
/// `None` when the lengths differ, which happens transiently while the
/// reconstructed fetch for a resized range is still in flight; callers treat
/// that as "no residual data yet", not as an error.
pub fn compute_residuals(original: &[f64], reconstructed: &[f64]) -> Option<Vec<f64>> {
    if original.len() != reconstructed.len() {
        return None;
    }
    Some(
        original
            .iter()
            .zip(reconstructed)
            .map(|(a, b)| a - b)
            .collect(),
    )
}

fn fold_min_max(acc: Option<(f64, f64)>, series: &[f64]) -> Option<(f64, f64)> {
    let mut acc = acc;
    for &v in series {
        acc = Some(match acc {
            None => (v, v),
            Some((min, max)) => (min.min(v), max.max(v)),
        });
    }
    acc
}

/// Value range spanned by the series visible under `mode`.
///
/// Residuals mode spans only the residual series; every other mode spans the
/// original plus, when shown, the reconstruction. Flat series are padded so
/// the range never collapses to zero height.
pub fn value_range(traces: &TraceSet, mode: ComparisonMode) -> Option<AxisRange> {
    let min_max = match traces {
        TraceSet::MultiChannel { channels } => channels
            .iter()
            .fold(None, |acc, series| fold_min_max(acc, series)),
        TraceSet::Single {
            raw,
            reconstructed,
            residuals,
        } => match mode {
            ComparisonMode::Residuals => {
                residuals.as_ref().and_then(|r| fold_min_max(None, r))
            }
            ComparisonMode::Overlay | ComparisonMode::SideBySide => {
                let acc = fold_min_max(None, raw);
                match reconstructed {
                    Some(recon) => fold_min_max(acc, recon),
                    None => acc,
                }
            }
            ComparisonMode::Original => fold_min_max(None, raw),
        },
    };
    min_max.map(|(min, max)| {
        if min == max {
            AxisRange::new(min - 1.0, max + 1.0)
        } else {
            AxisRange::new(min, max)
        }
    })
}

/// Channel view after a reconstruction is selected: reconstructed series are
/// only available per-channel, so the all-channels overlay falls back to
/// channel 0.
pub fn channel_view_for_comparison(current: ChannelView) -> ChannelView {
    match current {
        ChannelView::All => ChannelView::Single(0),
        single => single,
    }
}
