//! Chunked, cached, range-fetching access to a remote sample blob
//!
//! A client owns one data source. Samples are fetched in fixed spans of
//! `chunk_size` timepoints (all channels) via HTTP byte-range requests and
//! cached per chunk index for the client's lifetime. Concurrent requests for
//! the same chunk share a single network call: the first caller claims the
//! chunk and later callers park on a oneshot waiter list that is drained when
//! the fetch completes.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use ephys_charts_shared::{ChartsError, DatasetHeader, DatasetMeta, Result, SampleBuffer};

/// Timepoints per chunk. 1000 keeps interactive pans at a few requests each.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

type ChunkResult = Result<Arc<SampleBuffer>>;

pub struct ChunkedDataClient {
    http: reqwest::Client,
    metadata_url: String,
    data_url: String,
    chunk_size: usize,
    meta: Option<DatasetMeta>,
    /// Chunk index -> immutable fetched chunk. Never evicted, never mutated
    /// after insert.
    cache: Mutex<HashMap<usize, Arc<SampleBuffer>>>,
    /// Chunk index -> callers waiting on the fetch claimed by someone else.
    /// An entry exists exactly while a fetch is outstanding.
    in_flight: Mutex<HashMap<usize, Vec<oneshot::Sender<ChunkResult>>>>,
}

impl ChunkedDataClient {
    pub fn new(metadata_url: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self::with_chunk_size(metadata_url, data_url, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(
        metadata_url: impl Into<String>,
        data_url: impl Into<String>,
        chunk_size: usize,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            metadata_url: metadata_url.into(),
            data_url: data_url.into(),
            chunk_size: chunk_size.max(1),
            meta: None,
            cache: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch and parse the dataset metadata document. Must complete before
    /// any call to [`fetch_range`](Self::fetch_range) or the accessors.
    pub async fn initialize(&mut self) -> Result<DatasetMeta> {
        let resp = self
            .http
            .get(&self.metadata_url)
            .send()
            .await
            .map_err(|e| ChartsError::Metadata {
                message: e.to_string(),
            })?;
        if !resp.status().is_success() {
            return Err(ChartsError::Metadata {
                message: format!("HTTP {} fetching metadata", resp.status()),
            });
        }
        let header: DatasetHeader = resp.json().await.map_err(|e| ChartsError::Metadata {
            message: e.to_string(),
        })?;
        let meta = DatasetMeta::try_from(header)?;
        log::info!(
            "dataset ready: {} timepoints x {} channels ({})",
            meta.shape,
            meta.num_channels,
            meta.dtype
        );
        self.meta = Some(meta);
        Ok(meta)
    }

    pub fn meta(&self) -> Result<DatasetMeta> {
        self.meta.ok_or(ChartsError::Uninitialized)
    }

    pub fn shape(&self) -> Result<usize> {
        Ok(self.meta()?.shape)
    }

    pub fn num_channels(&self) -> Result<usize> {
        Ok(self.meta()?.num_channels)
    }

    pub fn dtype(&self) -> Result<ephys_charts_shared::Dtype> {
        Ok(self.meta()?.dtype)
    }

    /// Return `end - start` samples of one channel over `[start, end)`.
    ///
    /// Chunks covering the span are fetched concurrently (cache and in-flight
    /// de-duplication apply per chunk), then the requested channel is pulled
    /// out of the interleaved layout and stitched across chunk boundaries.
    pub async fn fetch_range(
        &self,
        start: usize,
        end: usize,
        channel: usize,
    ) -> Result<SampleBuffer> {
        let meta = self.meta()?;
        if channel >= meta.num_channels {
            return Err(ChartsError::InvalidChannel {
                channel,
                num_channels: meta.num_channels,
            });
        }
        if start >= end || end > meta.shape {
            return Err(ChartsError::InvalidRange {
                start,
                end,
                shape: meta.shape,
            });
        }

        let indices = chunk_indices(start, end, self.chunk_size);
        let chunks =
            futures::future::try_join_all(indices.clone().map(|i| self.fetch_chunk(i))).await?;

        let mut out = SampleBuffer::empty(meta.dtype);
        for (chunk, index) in chunks.iter().zip(indices) {
            let chunk_start = index * self.chunk_size;
            let chunk_timepoints = chunk.len() / meta.num_channels;
            let lo = start.max(chunk_start) - chunk_start;
            let hi = end.min(chunk_start + chunk_timepoints) - chunk_start;
            let picked = chunk.gather((lo..hi).map(|t| t * meta.num_channels + channel));
            out.append(&picked)?;
        }
        Ok(out)
    }

    /// Get one chunk, from cache, from a fetch already in flight, or by
    /// issuing the byte-range request ourselves.
    async fn fetch_chunk(&self, index: usize) -> ChunkResult {
        if let Some(chunk) = self.cache.lock().get(&index) {
            return Ok(chunk.clone());
        }

        // Join an in-flight fetch when one exists, otherwise claim the slot.
        let waiter = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get_mut(&index) {
                Some(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    in_flight.insert(index, Vec::new());
                    None
                }
            }
        };
        if let Some(rx) = waiter {
            return rx.await.map_err(|_| ChartsError::Fetch {
                message: format!("in-flight fetch for chunk {index} was dropped"),
                status: None,
            })?;
        }

        let result = self.fetch_chunk_uncached(index).await.map(Arc::new);

        // Publish to the cache before dropping the in-flight marker so a
        // caller arriving in between lands on the cached entry, not a second
        // network request. On failure the marker is still cleared and a
        // later call retries.
        if let Ok(chunk) = &result {
            self.cache.lock().insert(index, chunk.clone());
        }
        let waiters = self.in_flight.lock().remove(&index).unwrap_or_default();
        for tx in waiters {
            let _ = tx.send(result.clone());
        }
        result
    }

    async fn fetch_chunk_uncached(&self, index: usize) -> Result<SampleBuffer> {
        let meta = self.meta()?;
        let chunk_start = index * self.chunk_size;
        let chunk_end = (chunk_start + self.chunk_size).min(meta.shape);
        let elem = meta.dtype.element_size();
        let byte_start = chunk_start * meta.num_channels * elem;
        let byte_end = chunk_end * meta.num_channels * elem - 1;

        log::debug!("chunk {index}: requesting bytes {byte_start}-{byte_end}");
        let resp = self
            .http
            .get(&self.data_url)
            .header(
                reqwest::header::RANGE,
                format!("bytes={byte_start}-{byte_end}"),
            )
            .send()
            .await
            .map_err(|e| ChartsError::Fetch {
                message: e.to_string(),
                status: None,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ChartsError::Fetch {
                message: format!("HTTP {status} fetching chunk {index}"),
                status: Some(status.as_u16()),
            });
        }
        let body: Bytes = resp.bytes().await.map_err(|e| ChartsError::Fetch {
            message: e.to_string(),
            status: None,
        })?;

        let buffer = SampleBuffer::from_le_bytes(meta.dtype, &body)?;
        let expected = (chunk_end - chunk_start) * meta.num_channels;
        if buffer.len() != expected {
            return Err(ChartsError::Parse {
                message: format!(
                    "chunk {index}: expected {expected} samples, got {}",
                    buffer.len()
                ),
            });
        }
        Ok(buffer)
    }
}

/// Chunk indices covering the timepoint span `[start, end)`.
fn chunk_indices(start: usize, end: usize, chunk_size: usize) -> RangeInclusive<usize> {
    start / chunk_size..=(end - 1) / chunk_size
}
