//! Common error types used across all ephys-charts crates

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base error type for all viewer operations.
///
/// Cloneable so that a single fetch failure can be fanned out to every caller
/// waiting on the same in-flight chunk request.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ChartsError {
    /// Metadata fetch/parse failed or the dtype is unsupported.
    #[error("metadata error: {message}")]
    Metadata { message: String },

    /// A chunk byte-range request failed (network or non-2xx).
    #[error("range fetch failed: {message}")]
    Fetch {
        message: String,
        status: Option<u16>,
    },

    /// A response body could not be decoded into typed samples.
    #[error("data parse error: {message}")]
    Parse { message: String },

    /// Caller asked for a channel outside `[0, num_channels)`.
    #[error("channel {channel} out of range for {num_channels}-channel dataset")]
    InvalidChannel {
        channel: usize,
        num_channels: usize,
    },

    /// Caller asked for timepoints outside `[0, shape]`.
    #[error("range [{start}, {end}) outside dataset of {shape} timepoints")]
    InvalidRange {
        start: usize,
        end: usize,
        shape: usize,
    },

    /// Client used before `initialize()` completed.
    #[error("data client used before initialize() completed")]
    Uninitialized,

    /// The rendering surface could not be acquired in the worker.
    #[error("render context unavailable: {message}")]
    RenderContext { message: String },
}

/// Result type alias for viewer operations
pub type Result<T> = std::result::Result<T, ChartsError>;
