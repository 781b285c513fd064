//! Sparse spectral models of resolved variable slices.
//!
//! A [`SpectralModel`] is a [`SparseSpectrum`] fitted to a [`GridSlice`],
//! together with the slice's coordinates so predictions come back on the
//! same grid. [`ModelReport`] compares a prediction with the data it was
//! fitted on.

use std::fmt;
use std::hash::Hash;

use era5_common::{format_bytes, format_unit};
use serde::{Deserialize, Serialize};
use spectral_codec::{CodecConfig, ErrorMetrics, SparseSpectrum, Spectrum, SpectrumCache};
use tracing::debug;

use crate::error::{GridError, Result};
use crate::slice::GridSlice;

/// Bytes of 25 years of hourly f16 data for one variable on one level of
/// the 0.25° global grid.
pub const ARCHIVE_BYTES: u64 = 2 * 24 * 365 * 25 * 721 * 1440;

/// A sparse spectrum fitted to one variable slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralModel {
    /// Coordinates of the fitted slice; values are left empty.
    grid: GridSlice,
    spectrum: SparseSpectrum,
}

impl SpectralModel {
    /// Fit a model to `slice`. Axes of length one are dropped, so a single
    /// time and level gives a 2D latitude/longitude transform.
    pub fn fit(slice: &GridSlice, config: &CodecConfig) -> Result<Self> {
        let spectrum = Spectrum::forward(&slice.values, &slice.squeezed_shape())?;
        Self::from_spectrum(slice, &spectrum, config)
    }

    /// Like [`fit`](Self::fit), reusing the forward transform cached under
    /// `key` when one exists.
    pub fn fit_cached<K>(
        slice: &GridSlice,
        config: &CodecConfig,
        cache: &SpectrumCache<K>,
        key: K,
    ) -> Result<Self>
    where
        K: Eq + Hash + Clone + fmt::Debug,
    {
        let spectrum = cache.get_or_compute(key, || {
            Spectrum::forward(&slice.values, &slice.squeezed_shape())
        })?;
        if spectrum.shape() != slice.squeezed_shape().as_slice() {
            return Err(GridError::ShapeMismatch {
                name: slice.name.clone(),
                expected: spectrum.shape().iter().product(),
                actual: slice.len(),
            });
        }
        Self::from_spectrum(slice, &spectrum, config)
    }

    fn from_spectrum(slice: &GridSlice, spectrum: &Spectrum, config: &CodecConfig) -> Result<Self> {
        config.validate().map_err(GridError::config)?;
        let spectrum = SparseSpectrum::from_spectrum(spectrum, config)?;
        debug!(
            variable = %slice.name,
            shape = ?spectrum.shape,
            retained = spectrum.retained,
            ratio = spectrum.compression_ratio(),
            "Fitted spectral model"
        );
        Ok(Self {
            grid: GridSlice {
                values: Vec::new(),
                ..slice.clone()
            },
            spectrum,
        })
    }

    pub fn spectrum(&self) -> &SparseSpectrum {
        &self.spectrum
    }

    pub fn name(&self) -> &str {
        &self.grid.name
    }

    /// Reconstruct the slice from the retained coefficients.
    pub fn predict(&self) -> Result<GridSlice> {
        Ok(GridSlice {
            values: self.spectrum.decode()?,
            ..self.grid.clone()
        })
    }

    /// Size and error statistics against the data the model was fitted on.
    pub fn report(&self, original: &GridSlice) -> Result<ModelReport> {
        let prediction = self.predict()?;
        if original.len() != prediction.len() {
            return Err(GridError::ShapeMismatch {
                name: original.name.clone(),
                expected: prediction.len(),
                actual: original.len(),
            });
        }

        Ok(ModelReport {
            name: self.grid.name.clone(),
            unit: self.grid.unit.clone(),
            quantile: self.spectrum.quantile,
            retained: self.spectrum.retained,
            input_bytes: self.spectrum.input_bytes() as u64,
            encoded_bytes: self.spectrum.nbytes() as u64,
            metrics: ErrorMetrics::compute(&original.values, &prediction.values),
        })
    }
}

/// Size and accuracy of one fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub name: String,
    pub unit: String,
    pub quantile: f64,
    /// Number of retained frequencies.
    pub retained: usize,
    pub input_bytes: u64,
    pub encoded_bytes: u64,
    pub metrics: ErrorMetrics,
}

impl ModelReport {
    /// Encoded size as a fraction of the input size.
    pub fn size_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.encoded_bytes as f64 / self.input_bytes as f64
    }

    /// Size of the full hourly archive if every field compressed like this
    /// one.
    pub fn projected_archive_bytes(&self) -> u64 {
        (ARCHIVE_BYTES as f64 * self.size_ratio()).round() as u64
    }
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = format_unit(&self.unit);
        writeln!(f, "{} (quantile {})", self.name, self.quantile)?;
        writeln!(f, "  data std:    {:.4}{}", self.metrics.std, unit)?;
        writeln!(f, "  MAE:         {:.4}{}", self.metrics.mae, unit)?;
        writeln!(f, "  RMSE:        {:.4}{}", self.metrics.rmse, unit)?;
        writeln!(f, "  input size:  {}", format_bytes(self.input_bytes, false))?;
        writeln!(f, "  model size:  {}", format_bytes(self.encoded_bytes, false))?;
        writeln!(f, "  size ratio:  {:.2}%", self.size_ratio() * 100.0)?;
        writeln!(f, "  frequencies: {}", self.retained)?;
        write!(
            f,
            "  archive:     {} -> {}",
            format_bytes(ARCHIVE_BYTES, false),
            format_bytes(self.projected_archive_bytes(), false)
        )
    }
}

/// Aggregate of several model reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub reports: Vec<ModelReport>,
    pub input_bytes: u64,
    pub encoded_bytes: u64,
    pub mean_mae: f64,
    pub mean_rmse: f64,
}

impl Evaluation {
    pub fn from_reports(reports: Vec<ModelReport>) -> Self {
        let n = reports.len().max(1) as f64;
        Self {
            input_bytes: reports.iter().map(|r| r.input_bytes).sum(),
            encoded_bytes: reports.iter().map(|r| r.encoded_bytes).sum(),
            mean_mae: reports.iter().map(|r| r.metrics.mae).sum::<f64>() / n,
            mean_rmse: reports.iter().map(|r| r.metrics.rmse).sum::<f64>() / n,
            reports,
        }
    }

    pub fn size_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.encoded_bytes as f64 / self.input_bytes as f64
    }
}

/// Report every model against the slice it was fitted on.
pub fn evaluate<'a, I>(pairs: I) -> Result<Evaluation>
where
    I: IntoIterator<Item = (&'a SpectralModel, &'a GridSlice)>,
{
    let reports = pairs
        .into_iter()
        .map(|(model, original)| model.report(original))
        .collect::<Result<Vec<_>>>()?;
    Ok(Evaluation::from_reports(reports))
}
