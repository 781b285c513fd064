//! Raw DEFLATE wrapping for encoded buffers.
//!
//! Buffers are written as headerless deflate streams at maximum compression
//! with a 15-bit window. The compressor strategy is chosen per data class:
//! delta-coded coordinates compress best with [`DeflateStrategy::Filtered`],
//! f16 value bytes with [`DeflateStrategy::Default`].

use std::str::FromStr;

use flate2::{Decompress, FlushDecompress, Status};
use half::f16;
use miniz_oxide::deflate::core::{
    compress, create_comp_flags_from_zip_params, CompressionStrategy, CompressorOxide, TDEFLFlush,
    TDEFLStatus,
};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Maximum zlib compression level.
pub const MAX_LEVEL: i32 = 9;

/// Negative window bits select a raw stream without zlib header/trailer.
const RAW_WINDOW_BITS: i32 = -15;

/// Compressor strategy hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeflateStrategy {
    #[default]
    Default,
    Filtered,
    HuffmanOnly,
    Rle,
    Fixed,
}

impl FromStr for DeflateStrategy {
    type Err = CodecError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "filtered" => Ok(Self::Filtered),
            "huffman_only" | "huffman" => Ok(Self::HuffmanOnly),
            "rle" => Ok(Self::Rle),
            "fixed" => Ok(Self::Fixed),
            _ => Err(CodecError::UnknownStrategy(s.to_string())),
        }
    }
}

impl DeflateStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Filtered => "filtered",
            Self::HuffmanOnly => "huffman_only",
            Self::Rle => "rle",
            Self::Fixed => "fixed",
        }
    }

    fn zlib_code(&self) -> i32 {
        let strategy = match self {
            Self::Default => CompressionStrategy::Default,
            Self::Filtered => CompressionStrategy::Filtered,
            Self::HuffmanOnly => CompressionStrategy::HuffmanOnly,
            Self::Rle => CompressionStrategy::RLE,
            Self::Fixed => CompressionStrategy::Fixed,
        };
        strategy as i32
    }
}

impl std::fmt::Display for DeflateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compress bytes into a raw deflate stream.
pub fn encode_zlib(data: &[u8], strategy: DeflateStrategy) -> Result<Vec<u8>> {
    let flags = create_comp_flags_from_zip_params(MAX_LEVEL, RAW_WINDOW_BITS, strategy.zlib_code());
    let mut compressor = CompressorOxide::new(flags);

    let mut output = vec![0u8; (data.len() / 2).max(64)];
    let mut in_pos = 0;
    let mut out_pos = 0;

    loop {
        let (status, consumed, written) = compress(
            &mut compressor,
            &data[in_pos..],
            &mut output[out_pos..],
            TDEFLFlush::Finish,
        );
        in_pos += consumed;
        out_pos += written;

        match status {
            TDEFLStatus::Done => {
                output.truncate(out_pos);
                return Ok(output);
            }
            TDEFLStatus::Okay => {
                if output.len() - out_pos < 64 || written == 0 {
                    let grown = output.len() * 2;
                    output.resize(grown, 0);
                }
            }
            other => return Err(CodecError::Deflate(format!("{:?}", other))),
        }
    }
}

/// Inflate a raw deflate stream.
///
/// Malformed input and streams that end before their final block are
/// errors; partial output is never returned.
pub fn decode_zlib(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(false);
    let mut output = Vec::with_capacity(data.len().saturating_mul(4).max(64));

    loop {
        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();
        if output.len() == output.capacity() {
            output.reserve(output.capacity().max(64));
        }

        let status =
            inflater.decompress_vec(&data[consumed..], &mut output, FlushDecompress::Finish)?;

        match status {
            Status::StreamEnd => return Ok(output),
            Status::Ok | Status::BufError => {
                let stalled = inflater.total_out() == produced
                    && inflater.total_in() as usize == consumed;
                if stalled && output.len() < output.capacity() {
                    return Err(CodecError::Truncated);
                }
            }
        }
    }
}

/// Serialize f16 values little-endian and deflate them.
pub fn encode_f16_values(values: &[f16], strategy: DeflateStrategy) -> Result<Vec<u8>> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    encode_zlib(&bytes, strategy)
}

/// Inverse of [`encode_f16_values`].
pub fn decode_f16_values(data: &[u8]) -> Result<Vec<f16>> {
    let bytes = decode_zlib(data)?;
    if bytes.len() % 2 != 0 {
        return Err(CodecError::corrupt(format!(
            "f16 buffer has odd length {}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}
