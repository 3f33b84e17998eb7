//! Shared types for the ephys-charts viewer pipeline
//!
//! This crate contains the types shared between the data-client, renderer and
//! viewer crates: dtype-tagged sample buffers, dataset metadata, axis ranges,
//! comparison state, benchmark result records and the common error enum.

pub mod benchmark;
pub mod comparison;
pub mod data_types;
pub mod errors;
pub mod range;

pub use benchmark::BenchmarkResult;
pub use comparison::{ComparisonMode, ReconstructedInfo};
pub use data_types::{DatasetHeader, DatasetMeta, Dtype, SampleBuffer, ShapeSpec};
pub use errors::{ChartsError, Result};
pub use range::AxisRange;
