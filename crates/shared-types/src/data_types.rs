//! Dataset metadata and dtype-tagged sample buffers
//!
//! Raw samples live in a flat binary blob, row-major interleaved as
//! `[timepoint][channel]` with fixed-width little-endian elements. The closed
//! set of element types is mirrored here as a tagged buffer variant so that no
//! precision or sign conversion happens outside each dtype's natural
//! representation.

use serde::{Deserialize, Serialize};

use crate::errors::{ChartsError, Result};

/// Fixed-width numeric element type of a dataset's raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Uint8,
    Uint16,
    Uint32,
    Int16,
    Int32,
    Float32,
}

impl Dtype {
    /// Element width in bytes.
    pub fn element_size(&self) -> usize {
        match self {
            Dtype::Uint8 => 1,
            Dtype::Uint16 | Dtype::Int16 => 2,
            Dtype::Uint32 | Dtype::Int32 | Dtype::Float32 => 4,
        }
    }

    /// Parse a numpy-style dtype string ("uint16", "float32", ...).
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "uint8" => Ok(Dtype::Uint8),
            "uint16" => Ok(Dtype::Uint16),
            "uint32" => Ok(Dtype::Uint32),
            "int16" => Ok(Dtype::Int16),
            "int32" => Ok(Dtype::Int32),
            "float32" => Ok(Dtype::Float32),
            other => Err(ChartsError::Metadata {
                message: format!("unsupported dtype: {other}"),
            }),
        }
    }
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dtype::Uint8 => "uint8",
            Dtype::Uint16 => "uint16",
            Dtype::Uint32 => "uint32",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Float32 => "float32",
        };
        f.write_str(name)
    }
}

/// Raw metadata document served by the dataset JSON endpoint.
///
/// `shape` is either a scalar timepoint count or `[timepoints, channels]`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetHeader {
    pub shape: ShapeSpec,
    pub dtype: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShapeSpec {
    Scalar(u64),
    Dims(Vec<u64>),
}

/// Immutable dataset descriptor, validated from a [`DatasetHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Total timepoints.
    pub shape: usize,
    /// Channels per timepoint, >= 1.
    pub num_channels: usize,
    pub dtype: Dtype,
}

impl TryFrom<DatasetHeader> for DatasetMeta {
    type Error = ChartsError;

    fn try_from(header: DatasetHeader) -> Result<Self> {
        let dtype = Dtype::parse(&header.dtype)?;
        let (shape, num_channels) = match header.shape {
            ShapeSpec::Scalar(n) => (n, 1),
            ShapeSpec::Dims(dims) => match dims.as_slice() {
                [n] => (*n, 1),
                [n, c] => (*n, (*c).max(1)),
                _ => {
                    return Err(ChartsError::Metadata {
                        message: format!("expected 1- or 2-d shape, got {} dims", dims.len()),
                    })
                }
            },
        };
        if shape == 0 {
            return Err(ChartsError::Metadata {
                message: "dataset has zero timepoints".to_string(),
            });
        }
        Ok(DatasetMeta {
            shape: shape as usize,
            num_channels: num_channels as usize,
            dtype,
        })
    }
}

/// A typed run of samples, tagged by dtype.
///
/// Buffers are immutable once cached; every accessor is read-only except the
/// stitch helpers used while assembling a response.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
}

impl SampleBuffer {
    /// Decode a little-endian byte run into a typed buffer.
    pub fn from_le_bytes(dtype: Dtype, bytes: &[u8]) -> Result<Self> {
        let width = dtype.element_size();
        if bytes.len() % width != 0 {
            return Err(ChartsError::Parse {
                message: format!(
                    "byte length {} is not a multiple of element size {}",
                    bytes.len(),
                    width
                ),
            });
        }
        let buffer = match dtype {
            Dtype::Uint8 => SampleBuffer::Uint8(bytes.to_vec()),
            Dtype::Uint16 => SampleBuffer::Uint16(
                bytes
                    .chunks_exact(2)
                    .map(|b| u16::from_le_bytes([b[0], b[1]]))
                    .collect(),
            ),
            Dtype::Uint32 => SampleBuffer::Uint32(
                bytes
                    .chunks_exact(4)
                    .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            ),
            Dtype::Int16 => SampleBuffer::Int16(
                bytes
                    .chunks_exact(2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .collect(),
            ),
            Dtype::Int32 => SampleBuffer::Int32(
                bytes
                    .chunks_exact(4)
                    .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            ),
            Dtype::Float32 => SampleBuffer::Float32(
                bytes
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            ),
        };
        Ok(buffer)
    }

    /// Allocate an empty buffer of the given dtype.
    pub fn empty(dtype: Dtype) -> Self {
        match dtype {
            Dtype::Uint8 => SampleBuffer::Uint8(Vec::new()),
            Dtype::Uint16 => SampleBuffer::Uint16(Vec::new()),
            Dtype::Uint32 => SampleBuffer::Uint32(Vec::new()),
            Dtype::Int16 => SampleBuffer::Int16(Vec::new()),
            Dtype::Int32 => SampleBuffer::Int32(Vec::new()),
            Dtype::Float32 => SampleBuffer::Float32(Vec::new()),
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            SampleBuffer::Uint8(_) => Dtype::Uint8,
            SampleBuffer::Uint16(_) => Dtype::Uint16,
            SampleBuffer::Uint32(_) => Dtype::Uint32,
            SampleBuffer::Int16(_) => Dtype::Int16,
            SampleBuffer::Int32(_) => Dtype::Int32,
            SampleBuffer::Float32(_) => Dtype::Float32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SampleBuffer::Uint8(v) => v.len(),
            SampleBuffer::Uint16(v) => v.len(),
            SampleBuffer::Uint32(v) => v.len(),
            SampleBuffer::Int16(v) => v.len(),
            SampleBuffer::Int32(v) => v.len(),
            SampleBuffer::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index`, widened to f64 for plotting math.
    pub fn value(&self, index: usize) -> f64 {
        match self {
            SampleBuffer::Uint8(v) => v[index] as f64,
            SampleBuffer::Uint16(v) => v[index] as f64,
            SampleBuffer::Uint32(v) => v[index] as f64,
            SampleBuffer::Int16(v) => v[index] as f64,
            SampleBuffer::Int32(v) => v[index] as f64,
            SampleBuffer::Float32(v) => v[index] as f64,
        }
    }

    /// Copy out the samples at `indices`, preserving dtype.
    ///
    /// Used to pull one channel out of the interleaved layout: indices follow
    /// `t * num_channels + channel`.
    pub fn gather<I>(&self, indices: I) -> SampleBuffer
    where
        I: Iterator<Item = usize>,
    {
        match self {
            SampleBuffer::Uint8(v) => SampleBuffer::Uint8(indices.map(|i| v[i]).collect()),
            SampleBuffer::Uint16(v) => SampleBuffer::Uint16(indices.map(|i| v[i]).collect()),
            SampleBuffer::Uint32(v) => SampleBuffer::Uint32(indices.map(|i| v[i]).collect()),
            SampleBuffer::Int16(v) => SampleBuffer::Int16(indices.map(|i| v[i]).collect()),
            SampleBuffer::Int32(v) => SampleBuffer::Int32(indices.map(|i| v[i]).collect()),
            SampleBuffer::Float32(v) => SampleBuffer::Float32(indices.map(|i| v[i]).collect()),
        }
    }

    /// Append `other` onto `self`. Both buffers must share a dtype.
    pub fn append(&mut self, other: &SampleBuffer) -> Result<()> {
        match (&mut *self, other) {
            (SampleBuffer::Uint8(a), SampleBuffer::Uint8(b)) => a.extend_from_slice(b),
            (SampleBuffer::Uint16(a), SampleBuffer::Uint16(b)) => a.extend_from_slice(b),
            (SampleBuffer::Uint32(a), SampleBuffer::Uint32(b)) => a.extend_from_slice(b),
            (SampleBuffer::Int16(a), SampleBuffer::Int16(b)) => a.extend_from_slice(b),
            (SampleBuffer::Int32(a), SampleBuffer::Int32(b)) => a.extend_from_slice(b),
            (SampleBuffer::Float32(a), SampleBuffer::Float32(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(ChartsError::Parse {
                    message: format!("dtype mismatch: {} vs {}", a.dtype(), b.dtype()),
                })
            }
        }
        Ok(())
    }

    /// Widen the whole buffer to f64 for compositing and rendering.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            SampleBuffer::Uint8(v) => v.iter().map(|&x| x as f64).collect(),
            SampleBuffer::Uint16(v) => v.iter().map(|&x| x as f64).collect(),
            SampleBuffer::Uint32(v) => v.iter().map(|&x| x as f64).collect(),
            SampleBuffer::Int16(v) => v.iter().map(|&x| x as f64).collect(),
            SampleBuffer::Int32(v) => v.iter().map(|&x| x as f64).collect(),
            SampleBuffer::Float32(v) => v.iter().map(|&x| x as f64).collect(),
        }
    }

    /// Min and max across the buffer, or `None` if empty.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for i in 0..self.len() {
            let v = self.value(i);
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        Some((min, max))
    }
}
