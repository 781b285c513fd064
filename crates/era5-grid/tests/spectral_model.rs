//! Spectral models fitted to resolved slices.

mod common;

use std::sync::Arc;

use era5_grid::{evaluate, AxisSelection, GridError, GridQuery, MemoryStore, SpectralModel, TimeSelection};
use spectral_codec::{CodecConfig, CodecError, SpectrumCache};
use test_utils::grid::COARSE;

#[test]
fn test_model_of_resolved_plane() {
    let store = Arc::new(MemoryStore::new());
    let instant = common::hours(1)[0];
    common::populate(&store, &[instant]);
    let resolver = common::resolver(store);

    let slice = resolver
        .get(
            "temperature",
            &GridQuery::at(instant).level(AxisSelection::point(850.0)),
        )
        .unwrap();
    assert_eq!(slice.squeezed_shape(), vec![COARSE.nlat, COARSE.nlon]);

    let model = SpectralModel::fit(&slice, &CodecConfig::default()).unwrap();
    let predicted = model.predict().unwrap();
    assert_eq!(predicted.shape(), slice.shape());
    assert_eq!(predicted.time, slice.time);

    let report = model.report(&slice).unwrap();
    assert!(report.metrics.mae < 0.05 * report.metrics.std);
    // Sizes are measured against the packed f16 archive.
    assert_eq!(report.input_bytes, (COARSE.size() * 2) as u64);
    assert!(report.to_string().contains("temperature"));
}

#[test]
fn test_levels_form_a_volume() {
    let store = Arc::new(MemoryStore::new());
    let instant = common::hours(1)[0];
    common::populate(&store, &[instant]);
    let resolver = common::resolver(store);

    let slice = resolver.get("wind_speed", &GridQuery::at(instant)).unwrap();
    assert_eq!(slice.squeezed_shape().len(), 3);
    let model = SpectralModel::fit(&slice, &CodecConfig::with_quantile(0.5)).unwrap();
    assert_eq!(model.spectrum().shape, slice.squeezed_shape());
    assert!(model.report(&slice).unwrap().metrics.r2 > 0.9);
}

#[test]
fn test_four_axes_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let instants = common::hours(2);
    common::populate(&store, &instants);
    let resolver = common::resolver(store);

    let slice = resolver
        .get(
            "temperature",
            &GridQuery::new().time(TimeSelection::hourly(instants[0], instants[1])),
        )
        .unwrap();
    assert_eq!(slice.squeezed_shape().len(), 4);
    let err = SpectralModel::fit(&slice, &CodecConfig::default()).unwrap_err();
    assert!(matches!(err, GridError::Codec(CodecError::UnsupportedRank(4))));
}

#[test]
fn test_quantile_sweep_shares_transform() {
    let store = Arc::new(MemoryStore::new());
    let instant = common::hours(1)[0];
    common::populate(&store, &[instant]);
    let resolver = common::resolver(store);

    let cache = SpectrumCache::new();
    let mut fitted = Vec::new();
    for level in [1000.0, 850.0, 500.0] {
        let slice = resolver
            .get(
                "temperature",
                &GridQuery::at(instant).level(AxisSelection::point(level)),
            )
            .unwrap();
        for quantile in [0.5, 0.75, 0.95] {
            let model = SpectralModel::fit_cached(
                &slice,
                &CodecConfig::with_quantile(quantile),
                &cache,
                level as u16,
            )
            .unwrap();
            fitted.push((model, slice.clone()));
        }
    }

    let stats = cache.stats();
    assert_eq!((stats.misses, stats.hits, stats.entries), (3, 6, 3));

    let evaluation = evaluate(fitted.iter().map(|(m, s)| (m, s))).unwrap();
    assert_eq!(evaluation.reports.len(), 9);
    // Fewer coefficients at higher quantiles.
    for chunk in evaluation.reports.chunks(3) {
        assert!(chunk[0].retained >= chunk[1].retained);
        assert!(chunk[1].retained >= chunk[2].retained);
    }
}
