//! Test data generators for synthetic reanalysis-like fields.
//!
//! Every generator is deterministic: random components come from a seeded
//! `StdRng`, so the same arguments always produce the same data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::f32::consts::PI;

/// Seed used by the canonical noisy-sinusoid scenario.
pub const DEFAULT_SEED: u64 = 42;

/// One period of `sin(2πx/n) * amplitude` plus uniform noise in
/// `[-noise, noise)`.
///
/// # Example
///
/// ```
/// use test_utils::noisy_sinusoid;
///
/// let a = noisy_sinusoid(576, 10.0, 0.5, 42);
/// let b = noisy_sinusoid(576, 10.0, 0.5, 42);
/// assert_eq!(a, b);
/// ```
pub fn noisy_sinusoid(n: usize, amplitude: f32, noise: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|x| {
            let signal = (2.0 * PI * x as f32 / n as f32).sin() * amplitude;
            if noise > 0.0 {
                signal + rng.gen_range(-noise..noise)
            } else {
                signal
            }
        })
        .collect()
}

/// Latitudes from 90°N to 90°S, evenly spaced (ERA5 ordering).
pub fn regular_latitudes(count: usize) -> Vec<f32> {
    if count <= 1 {
        return vec![0.0; count];
    }
    let step = 180.0 / (count - 1) as f32;
    (0..count).map(|i| 90.0 - i as f32 * step).collect()
}

/// Longitudes from 0°E, evenly spaced over the full circle (360° excluded).
pub fn regular_longitudes(count: usize) -> Vec<f32> {
    let step = 360.0 / count.max(1) as f32;
    (0..count).map(|i| i as f32 * step).collect()
}

/// A smooth lat/lon plane built from a few low-order waves with seeded
/// phases, in row-major (lat, lon) order.
pub fn smooth_field(nlat: usize, nlon: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let waves: Vec<(f32, f32, f32, f32)> = (1..=3)
        .map(|k| {
            (
                k as f32,
                rng.gen_range(0.0..2.0 * PI),
                rng.gen_range(0.0..2.0 * PI),
                10.0 / k as f32,
            )
        })
        .collect();

    let mut data = Vec::with_capacity(nlat * nlon);
    for row in 0..nlat {
        let y = row as f32 / nlat.max(1) as f32;
        for col in 0..nlon {
            let x = col as f32 / nlon.max(1) as f32;
            let value: f32 = waves
                .iter()
                .map(|&(k, px, py, amp)| {
                    amp * (2.0 * PI * k * x + px).sin() * (PI * k * y + py).cos()
                })
                .sum();
            data.push(value);
        }
    }
    data
}

/// Temperature in Kelvin: warm equator, cold poles, colder aloft.
pub fn temperature_field(nlat: usize, nlon: usize, level_hpa: f32) -> Vec<f32> {
    let latitudes = regular_latitudes(nlat);
    let longitudes = regular_longitudes(nlon);
    // Roughly 6.5 K per km with ~7 km scale height.
    let altitude_km = -7.0 * (level_hpa / 1000.0).ln();
    let base = 300.0 - 6.5 * altitude_km.min(11.0);

    let mut data = Vec::with_capacity(nlat * nlon);
    for lat in &latitudes {
        let meridional = 40.0 * (lat.to_radians().cos() - 1.0);
        for lon in &longitudes {
            let zonal = 2.0 * (lon.to_radians() * 2.0).sin();
            data.push(base + meridional + zonal);
        }
    }
    data
}

/// U (eastward) wind in m/s: westerlies in mid-latitudes, easterlies in
/// the tropics.
pub fn u_wind_field(nlat: usize, nlon: usize) -> Vec<f32> {
    let latitudes = regular_latitudes(nlat);
    let mut data = Vec::with_capacity(nlat * nlon);
    for lat in &latitudes {
        let u = -15.0 * (3.0 * lat.to_radians()).cos() * lat.to_radians().cos();
        data.extend(std::iter::repeat(u).take(nlon));
    }
    data
}

/// V (northward) wind in m/s: a zonal wavenumber-2 pattern.
pub fn v_wind_field(nlat: usize, nlon: usize) -> Vec<f32> {
    let latitudes = regular_latitudes(nlat);
    let longitudes = regular_longitudes(nlon);
    let mut data = Vec::with_capacity(nlat * nlon);
    for lat in &latitudes {
        for lon in &longitudes {
            data.push(8.0 * (2.0 * lon.to_radians()).sin() * lat.to_radians().cos());
        }
    }
    data
}

/// Creates a grid where every cell has the same value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}
