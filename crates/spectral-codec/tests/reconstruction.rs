//! End-to-end tests for sparse spectrum encoding and reconstruction.

use half::f16;
use spectral_codec::metrics::{mae, quantile};
use spectral_codec::{
    CodecConfig, CodecError, Coefficient, ErrorMetrics, SparseSpectrum, Spectrum, SpectrumCache,
};
use test_utils::{create_constant_grid, noisy_sinusoid, smooth_field, DEFAULT_SEED};

// ============================================================================
// Canonical scenario
// ============================================================================

#[test]
fn test_sinusoid_576_scenario() {
    let data = noisy_sinusoid(576, 10.0, 0.5, DEFAULT_SEED);
    let sparse = SparseSpectrum::encode(&data, &[576], &CodecConfig::default()).unwrap();

    assert!(sparse.retained < 150, "retained {}", sparse.retained);
    assert!(sparse.retained > 0);

    let decoded = sparse.decode().unwrap();
    assert_eq!(decoded.len(), 576);
    let error = mae(&data, &decoded);
    assert!(error < 1.0, "MAE {}", error);
}

#[test]
fn test_mae_decreases_as_quantile_decreases() {
    let data = noisy_sinusoid(576, 10.0, 0.5, DEFAULT_SEED);
    let spectrum = Spectrum::forward(&data, &[576]).unwrap();

    let quantiles = [0.99, 0.95, 0.9, 0.75, 0.5, 0.25];
    let mut previous_mae = f64::INFINITY;
    let mut previous_retained = 0;

    for q in quantiles {
        let sparse = SparseSpectrum::from_spectrum(&spectrum, &CodecConfig::with_quantile(q)).unwrap();
        let error = mae(&data, &sparse.decode().unwrap());

        assert!(sparse.retained >= previous_retained);
        assert!(
            error <= previous_mae + 1e-3,
            "quantile {} MAE {} above previous {}",
            q,
            error,
            previous_mae
        );
        previous_mae = error;
        previous_retained = sparse.retained;
    }
}

// ============================================================================
// Coefficient retention
// ============================================================================

#[test]
fn test_decoded_coefficients_match_retained_set_exactly() {
    let shape = [12, 24];
    let data = smooth_field(12, 24, 5);
    let spectrum = Spectrum::forward(&data, &shape).unwrap();
    let config = CodecConfig::default();
    let cutoff = spectrum.cutoff(config.quantile).unwrap();

    let sparse = SparseSpectrum::from_spectrum(&spectrum, &config).unwrap();
    assert_eq!(sparse.cutoff, cutoff);
    let decoded = sparse.decode_coefficients().unwrap();

    assert_eq!(decoded.len(), spectrum.coefficients().len());
    let mut retained = 0;
    for (original, restored) in spectrum.coefficients().iter().zip(&decoded) {
        if original.norm() > cutoff {
            retained += 1;
            let expected = Coefficient::new(
                f16::from_f64(original.re).to_f64(),
                f16::from_f64(original.im).to_f64(),
            );
            assert_eq!(*restored, expected);
        } else {
            assert_eq!(*restored, Coefficient::default());
        }
    }
    assert_eq!(retained, sparse.retained);
}

#[test]
fn test_cutoff_is_amplitude_quantile() {
    let data = noisy_sinusoid(100, 3.0, 1.0, 9);
    let spectrum = Spectrum::forward(&data, &[100]).unwrap();
    let amplitudes = spectrum.amplitudes();
    assert_eq!(spectrum.cutoff(0.75).unwrap(), quantile(&amplitudes, 0.75));
    assert!(matches!(spectrum.cutoff(2.0), Err(CodecError::InvalidQuantile(_))));
}

// ============================================================================
// Dimensionality
// ============================================================================

#[test]
fn test_2d_plane_reconstruction() {
    let (nlat, nlon) = (32, 64);
    let data = smooth_field(nlat, nlon, 11);
    let sparse = SparseSpectrum::encode(&data, &[nlat, nlon], &CodecConfig::default()).unwrap();
    let decoded = sparse.decode().unwrap();

    let metrics = ErrorMetrics::compute(&data, &decoded);
    assert!(metrics.mae < 0.05 * metrics.std, "{:?}", metrics);
    assert!(metrics.r2 > 0.99);
    assert!(sparse.compression_ratio() > 1.5);
}

#[test]
fn test_3d_volume_reconstruction() {
    let shape = [4, 16, 32];
    let data: Vec<f32> = (0..4)
        .flat_map(|level| {
            smooth_field(16, 32, 21)
                .into_iter()
                .map(move |v| v + level as f32 * 5.0)
        })
        .collect();

    let sparse = SparseSpectrum::encode(&data, &shape, &CodecConfig::default()).unwrap();
    assert_eq!(sparse.coordinates.len(), 3);
    let decoded = sparse.decode().unwrap();
    assert_eq!(decoded.len(), data.len());

    let metrics = ErrorMetrics::compute(&data, &decoded);
    assert!(metrics.r2 > 0.95, "{:?}", metrics);
}

// ============================================================================
// Degenerate input
// ============================================================================

#[test]
fn test_constant_field_decodes_to_mean() {
    let data = create_constant_grid(24, 12, 287.5);
    let sparse = SparseSpectrum::encode(&data, &[12, 24], &CodecConfig::default()).unwrap();

    assert_eq!(sparse.retained, 0);
    let decoded = sparse.decode().unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn test_single_sample() {
    let sparse = SparseSpectrum::encode(&[4.25], &[1], &CodecConfig::default()).unwrap();
    assert_eq!(sparse.retained, 0);
    assert_eq!(sparse.decode().unwrap(), vec![4.25]);
}

// ============================================================================
// Corrupt input
// ============================================================================

fn encoded_sample() -> SparseSpectrum {
    let data = noisy_sinusoid(576, 10.0, 0.5, DEFAULT_SEED);
    SparseSpectrum::encode(&data, &[576], &CodecConfig::default()).unwrap()
}

#[test]
fn test_truncated_value_buffer_is_error() {
    let mut sparse = encoded_sample();
    let half = sparse.real.len() / 2;
    sparse.real.truncate(half);
    assert!(sparse.decode().is_err());
}

#[test]
fn test_garbage_coordinates_are_error() {
    let mut sparse = encoded_sample();
    sparse.coordinates[0] = vec![0xff; 8];
    assert!(matches!(sparse.decode(), Err(CodecError::Inflate(_))));
}

#[test]
fn test_retained_count_mismatch_is_corrupt() {
    let mut sparse = encoded_sample();
    sparse.retained += 1;
    assert!(matches!(sparse.decode(), Err(CodecError::Corrupt(_))));
}

// ============================================================================
// Persistence and caching
// ============================================================================

#[test]
fn test_serialized_spectrum_decodes_identically() {
    let sparse = encoded_sample();
    let json = serde_json::to_string(&sparse).unwrap();
    let restored: SparseSpectrum = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, sparse);
    assert_eq!(restored.decode().unwrap(), sparse.decode().unwrap());
}

#[test]
fn test_cached_spectrum_serves_several_quantiles() {
    let cache: SpectrumCache<u16> = SpectrumCache::new();
    let data = smooth_field(16, 32, 2);

    let mut sizes = Vec::new();
    for q in [0.5, 0.75, 0.9] {
        let spectrum = cache
            .get_or_compute(850, || Spectrum::forward(&data, &[16, 32]))
            .unwrap();
        let sparse = SparseSpectrum::from_spectrum(&spectrum, &CodecConfig::with_quantile(q)).unwrap();
        sizes.push(sparse.retained);
    }

    assert!(sizes[0] > sizes[1] && sizes[1] > sizes[2]);
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(cache.stats().hits, 2);
}
