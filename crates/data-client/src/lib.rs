//! Data client for the ephys-charts viewer
//!
//! Handles all remote data access: chunk-granular byte-range fetching of raw
//! sample blobs with caching and in-flight de-duplication, dataset metadata
//! initialization, and the thin benchmark-results feed.

pub mod client;
pub mod results;

pub use client::{ChunkedDataClient, DEFAULT_CHUNK_SIZE};
pub use results::{comparison_candidates, fetch_benchmark_results};
