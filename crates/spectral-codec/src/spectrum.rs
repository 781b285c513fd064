//! Sparse quantile-thresholded spectra.
//!
//! A [`Spectrum`] is the dense forward transform of a standardized array.
//! A [`SparseSpectrum`] keeps only the coefficients whose amplitude is
//! strictly above a quantile of all amplitudes, stored as f16 real and
//! imaginary parts plus one delta-coded coordinate buffer per axis.

use half::f16;
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CodecConfig;
use crate::deflate::{decode_f16_values, encode_f16_values};
use crate::delta::{decode_coordinates, encode_coordinates};
use crate::error::{CodecError, Result};
use crate::fft::{irfftn, rfftn, spectrum_shape, strides, validate_shape, Coefficient};
use crate::metrics::quantile;

/// Largest supported number of axes.
pub const MAX_RANK: usize = 3;

fn check_rank(shape: &[usize]) -> Result<usize> {
    if shape.is_empty() || shape.len() > MAX_RANK {
        return Err(CodecError::UnsupportedRank(shape.len()));
    }
    validate_shape(shape)
}

fn check_quantile(q: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&q) {
        return Err(CodecError::InvalidQuantile(q));
    }
    Ok(())
}

/// Dense forward transform of a standardized array.
#[derive(Debug, Clone)]
pub struct Spectrum {
    shape: Vec<usize>,
    mean: f64,
    std: f64,
    coefficients: Vec<Coefficient>,
}

impl Spectrum {
    /// Standardize `data` and transform it.
    ///
    /// A constant array has an all-zero spectrum and keeps its value as the
    /// mean. A zero standard deviation is treated as 1.
    pub fn forward(data: &[f32], shape: &[usize]) -> Result<Self> {
        let total = check_rank(shape)?;
        if data.len() != total {
            return Err(CodecError::ShapeMismatch {
                expected: total,
                actual: data.len(),
            });
        }

        let first = data[0] as f64;
        let (mean, std) = if data.iter().all(|&v| v as f64 == first) {
            (first, 1.0)
        } else {
            let n = total as f64;
            let mean = data.iter().map(|&v| v as f64).sum::<f64>() / n;
            let var = data.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            (mean, if std > 0.0 { std } else { 1.0 })
        };

        let standardized: Vec<f64> = data.iter().map(|&v| (v as f64 - mean) / std).collect();
        let coefficients = rfftn(&standardized, shape)?;

        Ok(Self {
            shape: shape.to_vec(),
            mean,
            std,
            coefficients,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Shape of the stored half spectrum.
    pub fn spectrum_shape(&self) -> Vec<usize> {
        spectrum_shape(&self.shape)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    /// Row-major half-spectrum coefficients.
    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    /// Complex magnitude of every coefficient.
    pub fn amplitudes(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.norm()).collect()
    }

    /// Amplitude cutoff at quantile `q`.
    pub fn cutoff(&self, q: f64) -> Result<f64> {
        check_quantile(q)?;
        Ok(quantile(&self.amplitudes(), q))
    }

    /// Full-precision inverse of the dense spectrum.
    pub fn inverse(&self) -> Result<Vec<f32>> {
        let values = irfftn(&self.coefficients, &self.shape)?;
        Ok(values
            .into_iter()
            .map(|v| (v * self.std + self.mean) as f32)
            .collect())
    }
}

/// Encoded sparse spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseSpectrum {
    /// Shape of the original array.
    pub shape: Vec<usize>,
    /// Quantile used for the cutoff. Diagnostic only.
    pub quantile: f64,
    /// Amplitude cutoff; retained coefficients are strictly above it.
    pub cutoff: f64,
    pub mean: f64,
    pub std: f64,
    /// Number of retained coefficients.
    pub retained: usize,
    /// Deflated little-endian f16 real parts.
    pub real: Vec<u8>,
    /// Deflated little-endian f16 imaginary parts.
    pub imag: Vec<u8>,
    /// One delta-coded, deflated coordinate buffer per axis.
    pub coordinates: Vec<Vec<u8>>,
}

impl SparseSpectrum {
    /// Transform and threshold `data` in one step.
    pub fn encode(data: &[f32], shape: &[usize], config: &CodecConfig) -> Result<Self> {
        check_quantile(config.quantile)?;
        let spectrum = Spectrum::forward(data, shape)?;
        Self::from_spectrum(&spectrum, config)
    }

    /// Threshold an already computed spectrum.
    pub fn from_spectrum(spectrum: &Spectrum, config: &CodecConfig) -> Result<Self> {
        let amplitudes = spectrum.amplitudes();
        check_quantile(config.quantile)?;
        let cutoff = quantile(&amplitudes, config.quantile);

        let half_shape = spectrum.spectrum_shape();
        let half_strides = strides(&half_shape);
        let rank = half_shape.len();

        let mut axes: Vec<Vec<u16>> = vec![Vec::new(); rank];
        let mut real = Vec::new();
        let mut imag = Vec::new();

        for (index, (&amplitude, coefficient)) in amplitudes
            .iter()
            .zip(spectrum.coefficients())
            .enumerate()
        {
            if amplitude <= cutoff {
                continue;
            }
            for (axis, (&stride, &len)) in half_strides.iter().zip(&half_shape).enumerate() {
                let coordinate = (index / stride) % len;
                let coordinate = u16::try_from(coordinate).map_err(|_| {
                    CodecError::CoordinateOverflow {
                        axis,
                        value: coordinate,
                    }
                })?;
                axes[axis].push(coordinate);
            }
            real.push(f16::from_f64(coefficient.re));
            imag.push(f16::from_f64(coefficient.im));
        }

        let retained = real.len();
        let coordinates = axes
            .iter()
            .map(|axis| encode_coordinates(axis, config.index_strategy))
            .collect::<Result<Vec<_>>>()?;

        let sparse = Self {
            shape: spectrum.shape().to_vec(),
            quantile: config.quantile,
            cutoff,
            mean: spectrum.mean(),
            std: spectrum.std(),
            retained,
            real: encode_f16_values(&real, config.value_strategy)?,
            imag: encode_f16_values(&imag, config.value_strategy)?,
            coordinates,
        };

        debug!(
            shape = ?sparse.shape,
            quantile = sparse.quantile,
            cutoff = sparse.cutoff,
            retained = retained,
            total = amplitudes.len(),
            bytes = sparse.nbytes(),
            "Encoded sparse spectrum"
        );

        Ok(sparse)
    }

    /// Rebuild the half spectrum: retained coefficients at their stored
    /// coordinates, zero elsewhere.
    pub fn decode_coefficients(&self) -> Result<Vec<Coefficient>> {
        check_rank(&self.shape)?;
        let half_shape = spectrum_shape(&self.shape);
        let half_strides = strides(&half_shape);

        if self.coordinates.len() != half_shape.len() {
            return Err(CodecError::corrupt(format!(
                "expected {} coordinate buffers, found {}",
                half_shape.len(),
                self.coordinates.len()
            )));
        }

        let axes = self
            .coordinates
            .iter()
            .map(|buffer| decode_coordinates(buffer))
            .collect::<Result<Vec<_>>>()?;
        let real = decode_f16_values(&self.real)?;
        let imag = decode_f16_values(&self.imag)?;

        if real.len() != self.retained || imag.len() != self.retained {
            return Err(CodecError::corrupt(format!(
                "expected {} values, found {} real and {} imaginary",
                self.retained,
                real.len(),
                imag.len()
            )));
        }
        for (axis, coordinates) in axes.iter().enumerate() {
            if coordinates.len() != self.retained {
                return Err(CodecError::corrupt(format!(
                    "axis {} has {} coordinates for {} values",
                    axis,
                    coordinates.len(),
                    self.retained
                )));
            }
        }

        let mut spectrum = vec![Coefficient::default(); half_shape.iter().product()];
        for i in 0..self.retained {
            let mut flat = 0;
            for (axis, coordinates) in axes.iter().enumerate() {
                let coordinate = coordinates[i] as usize;
                if coordinate >= half_shape[axis] {
                    return Err(CodecError::corrupt(format!(
                        "coordinate {} out of range on axis {} (len {})",
                        coordinate, axis, half_shape[axis]
                    )));
                }
                flat += coordinate * half_strides[axis];
            }
            spectrum[flat] = Complex::new(real[i].to_f64(), imag[i].to_f64());
        }

        Ok(spectrum)
    }

    /// Reconstruct an approximation of the original array.
    pub fn decode(&self) -> Result<Vec<f32>> {
        let coefficients = self.decode_coefficients()?;
        let values = irfftn(&coefficients, &self.shape)?;
        Ok(values
            .into_iter()
            .map(|v| (v * self.std + self.mean) as f32)
            .collect())
    }

    /// Total size of the encoded buffers in bytes.
    pub fn nbytes(&self) -> usize {
        self.real.len() + self.imag.len() + self.coordinates.iter().map(Vec::len).sum::<usize>()
    }

    /// Size of the original array as stored on disk, packed to f16.
    pub fn input_bytes(&self) -> usize {
        self.shape.iter().product::<usize>() * std::mem::size_of::<f16>()
    }

    /// Original size over encoded size.
    pub fn compression_ratio(&self) -> f64 {
        let encoded = self.nbytes();
        if encoded == 0 {
            return 0.0;
        }
        self.input_bytes() as f64 / encoded as f64
    }

    /// Share of half-spectrum coefficients that were retained.
    pub fn retained_fraction(&self) -> f64 {
        let total: usize = spectrum_shape(&self.shape).iter().product();
        if total == 0 {
            return 0.0;
        }
        self.retained as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * i as f32 / n as f32).sin() * 10.0 + 3.0)
            .collect()
    }

    #[test]
    fn test_forward_standardizes() {
        let spectrum = Spectrum::forward(&wave(64), &[64]).unwrap();
        assert!((spectrum.mean() - 3.0).abs() < 1e-5);
        // DC of a zero-mean signal vanishes.
        assert!(spectrum.coefficients()[0].norm() < 1e-9);
    }

    #[test]
    fn test_forward_inverse_is_near_exact() {
        let data = wave(48);
        let back = Spectrum::forward(&data, &[48]).unwrap().inverse().unwrap();
        for (a, b) in data.iter().zip(&back) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_pure_sine_reconstructs() {
        let sparse = SparseSpectrum::encode(&wave(64), &[64], &CodecConfig::default()).unwrap();
        // At most a quarter of the 33 half-spectrum bins.
        assert!(sparse.retained >= 1 && sparse.retained <= 9);
        let decoded = sparse.decode().unwrap();
        for (a, b) in wave(64).iter().zip(&decoded) {
            assert!((a - b).abs() < 0.05, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_rank_limits() {
        assert!(matches!(
            Spectrum::forward(&[0.0; 16], &[2, 2, 2, 2]),
            Err(CodecError::UnsupportedRank(4))
        ));
        assert!(matches!(
            Spectrum::forward(&[], &[]),
            Err(CodecError::UnsupportedRank(0))
        ));
    }

    #[test]
    fn test_invalid_quantile() {
        let config = CodecConfig::with_quantile(1.2);
        assert!(matches!(
            SparseSpectrum::encode(&wave(8), &[8], &config),
            Err(CodecError::InvalidQuantile(_))
        ));
    }

    #[test]
    fn test_constant_input_retains_nothing() {
        let sparse = SparseSpectrum::encode(&[0.1; 30], &[5, 6], &CodecConfig::default()).unwrap();
        assert_eq!(sparse.retained, 0);
        assert_eq!(sparse.decode().unwrap(), vec![0.1f32; 30]);
    }

    #[test]
    fn test_quantile_one_retains_nothing() {
        let config = CodecConfig::with_quantile(1.0);
        let sparse = SparseSpectrum::encode(&wave(32), &[32], &config).unwrap();
        assert_eq!(sparse.retained, 0);
        let decoded = sparse.decode().unwrap();
        assert!(decoded.iter().all(|&v| (v - sparse.mean as f32).abs() < 1e-6));
    }

    #[test]
    fn test_missing_coordinate_buffer_is_corrupt() {
        let mut sparse =
            SparseSpectrum::encode(&wave(32), &[4, 8], &CodecConfig::default()).unwrap();
        sparse.coordinates.pop();
        assert!(matches!(
            sparse.decode(),
            Err(CodecError::Corrupt(_))
        ));
    }

    #[test]
    fn test_size_accounting() {
        let sparse = SparseSpectrum::encode(&wave(256), &[256], &CodecConfig::default()).unwrap();
        assert_eq!(sparse.input_bytes(), 512);
        assert!(sparse.nbytes() > 0);
        assert!(sparse.compression_ratio() > 1.0);
        assert!(sparse.retained_fraction() <= 0.25);
    }
}
