//! N-dimensional real FFT in `rfftn` / `irfftn` layout.
//!
//! The forward transform takes a real row-major array, runs a real FFT over
//! the last axis (keeping the `n / 2 + 1` non-redundant bins) and a complex
//! FFT over every other axis. It is scaled by `1 / N` ("forward"
//! normalization), so the inverse is unscaled.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::{CodecError, Result};

/// Complex coefficient type used by the codec.
pub type Coefficient = Complex<f64>;

// ==================== FFT Planner Cache ====================

/// Plans per length and direction, reused across transforms on one thread.
struct PlannerCache {
    planner: FftPlanner<f64>,
    forward: HashMap<usize, Arc<dyn Fft<f64>>>,
    inverse: HashMap<usize, Arc<dyn Fft<f64>>>,
}

impl PlannerCache {
    fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            forward: HashMap::new(),
            inverse: HashMap::new(),
        }
    }

    fn plan(&mut self, len: usize, direction: Direction) -> Arc<dyn Fft<f64>> {
        let (plans, planner) = match direction {
            Direction::Forward => (&mut self.forward, &mut self.planner),
            Direction::Inverse => (&mut self.inverse, &mut self.planner),
        };
        if let Some(fft) = plans.get(&len) {
            return Arc::clone(fft);
        }
        let fft = match direction {
            Direction::Forward => planner.plan_fft_forward(len),
            Direction::Inverse => planner.plan_fft_inverse(len),
        };
        plans.insert(len, Arc::clone(&fft));
        fft
    }
}

thread_local! {
    static PLANNERS: RefCell<PlannerCache> = RefCell::new(PlannerCache::new());
}

fn plan(len: usize, direction: Direction) -> Arc<dyn Fft<f64>> {
    PLANNERS.with(|cache| cache.borrow_mut().plan(len, direction))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

// ==================== Shapes ====================

/// Check that a shape is non-empty with positive axes, returning its size.
pub fn validate_shape(shape: &[usize]) -> Result<usize> {
    if shape.is_empty() || shape.contains(&0) {
        return Err(CodecError::InvalidShape(shape.to_vec()));
    }
    Ok(shape.iter().product())
}

/// Shape of the half spectrum produced by [`rfftn`].
pub fn spectrum_shape(shape: &[usize]) -> Vec<usize> {
    let mut out = shape.to_vec();
    if let Some(last) = out.last_mut() {
        *last = *last / 2 + 1;
    }
    out
}

/// Row-major strides of a shape.
pub fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Apply a complex FFT along one axis of a row-major buffer.
fn transform_axis(buffer: &mut [Coefficient], shape: &[usize], axis: usize, direction: Direction) {
    let len = shape[axis];
    if len <= 1 {
        return;
    }

    let inner: usize = shape[axis + 1..].iter().product();
    let outer: usize = shape[..axis].iter().product();
    let fft = plan(len, direction);
    let mut line = vec![Coefficient::default(); len];

    for o in 0..outer {
        for i in 0..inner {
            let base = o * len * inner + i;
            for (k, slot) in line.iter_mut().enumerate() {
                *slot = buffer[base + k * inner];
            }
            fft.process(&mut line);
            for (k, value) in line.iter().enumerate() {
                buffer[base + k * inner] = *value;
            }
        }
    }
}

// ==================== Transforms ====================

/// Forward N-dimensional real FFT with `1 / N` scaling.
pub fn rfftn(data: &[f64], shape: &[usize]) -> Result<Vec<Coefficient>> {
    let total = validate_shape(shape)?;
    if data.len() != total {
        return Err(CodecError::ShapeMismatch {
            expected: total,
            actual: data.len(),
        });
    }

    let n = shape[shape.len() - 1];
    let half = n / 2 + 1;
    let rows = total / n;
    let fft = plan(n, Direction::Forward);

    let mut out = vec![Coefficient::default(); rows * half];
    let mut line = vec![Coefficient::default(); n];
    for row in 0..rows {
        for (slot, &x) in line.iter_mut().zip(&data[row * n..(row + 1) * n]) {
            *slot = Complex::new(x, 0.0);
        }
        fft.process(&mut line);
        out[row * half..(row + 1) * half].copy_from_slice(&line[..half]);
    }

    let half_shape = spectrum_shape(shape);
    for axis in 0..shape.len() - 1 {
        transform_axis(&mut out, &half_shape, axis, Direction::Forward);
    }

    let scale = 1.0 / total as f64;
    for value in out.iter_mut() {
        *value *= scale;
    }
    Ok(out)
}

/// Inverse of [`rfftn`]: unscaled, returns a real array of `shape`.
///
/// The imaginary parts of the zero-frequency bin (and of the Nyquist bin
/// for even lengths) do not contribute to the output.
pub fn irfftn(spectrum: &[Coefficient], shape: &[usize]) -> Result<Vec<f64>> {
    validate_shape(shape)?;
    let half_shape = spectrum_shape(shape);
    let expected: usize = half_shape.iter().product();
    if spectrum.len() != expected {
        return Err(CodecError::ShapeMismatch {
            expected,
            actual: spectrum.len(),
        });
    }

    let mut buffer = spectrum.to_vec();
    for axis in 0..shape.len() - 1 {
        transform_axis(&mut buffer, &half_shape, axis, Direction::Inverse);
    }

    let n = shape[shape.len() - 1];
    let half = n / 2 + 1;
    let rows = buffer.len() / half;
    let ifft = plan(n, Direction::Inverse);

    let mut out = Vec::with_capacity(rows * n);
    let mut line = vec![Coefficient::default(); n];
    for row in 0..rows {
        let bins = &buffer[row * half..(row + 1) * half];
        line[..half].copy_from_slice(bins);
        for k in half..n {
            line[k] = bins[n - k].conj();
        }
        ifft.process(&mut line);
        out.extend(line.iter().map(|c| c.re));
    }
    Ok(out)
}
