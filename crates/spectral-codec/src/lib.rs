//! Sparse Fourier-domain codec for smooth gridded fields.
//!
//! Encoding standardizes a 1D, 2D or 3D array, takes its real FFT and keeps
//! only the coefficients whose amplitude is strictly above a quantile of
//! all amplitudes. Retained values are stored as f16, their coordinates as
//! byte-wise delta codes, and every buffer is raw-deflated.
//!
//! # Example
//!
//! ```
//! use spectral_codec::{CodecConfig, SparseSpectrum};
//!
//! let data: Vec<f32> = (0..576)
//!     .map(|i| (2.0 * std::f32::consts::PI * i as f32 / 576.0).sin() * 10.0)
//!     .collect();
//! let sparse = SparseSpectrum::encode(&data, &[576], &CodecConfig::default()).unwrap();
//! let restored = sparse.decode().unwrap();
//! assert_eq!(restored.len(), 576);
//! ```

pub mod cache;
pub mod config;
pub mod deflate;
pub mod delta;
pub mod error;
pub mod fft;
pub mod metrics;
pub mod spectrum;

pub use cache::{CacheStats, SpectrumCache};
pub use config::{CodecConfig, DEFAULT_QUANTILE};
pub use deflate::{decode_zlib, encode_zlib, DeflateStrategy};
pub use delta::{decode_difference_u8, encode_difference_u8};
pub use error::{CodecError, Result};
pub use fft::{irfftn, rfftn, Coefficient};
pub use metrics::ErrorMetrics;
pub use spectrum::{SparseSpectrum, Spectrum};
