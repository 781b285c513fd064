//! Common fixtures for era5-grid integration tests
//!
//! Provides helpers for:
//! - Building synthetic grid files on the coarse test grid
//! - Populating an in-memory store for a set of instants
//! - Constructing resolvers over that store

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use era5_common::{era5_file_path, DataLevel, Era5DateTime};
use era5_grid::{Dataset, MemoryStore, ResolverConfig, VariableRegistry, VariableResolver};
use test_utils::grid::COARSE;
use test_utils::levels;
use test_utils::{temperature_field, u_wind_field, v_wind_field};

pub const U: &str = "u_component_of_wind";
pub const V: &str = "v_component_of_wind";

/// Root folder the fixtures are stored under.
pub fn data_dir() -> PathBuf {
    PathBuf::from("/era5")
}

/// A grid file for one instant on the coarse grid and the small level set.
///
/// Temperature is offset by `offset` so files for different instants can be
/// told apart.
pub fn grid_file(instant: Era5DateTime, offset: f32) -> Dataset {
    let levels: Vec<f32> = levels::SMALL.iter().map(|&l| l as f32).collect();
    let mut ds = Dataset::new(
        vec![instant],
        levels.clone(),
        COARSE.latitudes(),
        COARSE.longitudes(),
    );

    let mut temperature = Vec::new();
    let mut u = Vec::new();
    let mut v = Vec::new();
    for &level in &levels {
        temperature.extend(
            temperature_field(COARSE.nlat, COARSE.nlon, level)
                .into_iter()
                .map(|t| t + offset),
        );
        u.extend(u_wind_field(COARSE.nlat, COARSE.nlon));
        v.extend(v_wind_field(COARSE.nlat, COARSE.nlon));
    }
    let omega = vec![0.1; temperature.len()];

    ds.insert("temperature", temperature).unwrap();
    ds.insert(U, u).unwrap();
    ds.insert(V, v).unwrap();
    ds.insert("vertical_velocity", omega).unwrap();
    ds
}

/// Store `grid_file(instant, i)` for every instant, at the hourly path.
pub fn populate(store: &MemoryStore, instants: &[Era5DateTime]) {
    for (i, instant) in instants.iter().enumerate() {
        let path = era5_file_path(&data_dir(), instant, DataLevel::Hour);
        store.insert(path, grid_file(*instant, i as f32));
    }
}

pub fn config(worker_threads: usize) -> ResolverConfig {
    ResolverConfig {
        data_dir: data_dir(),
        data_level: DataLevel::Hour,
        worker_threads,
        ..Default::default()
    }
}

pub fn resolver(reader: Arc<MemoryStore>) -> VariableResolver {
    VariableResolver::new(VariableRegistry::era5(), reader, config(4)).unwrap()
}

/// `count` consecutive climatological hours starting at `TAVG-01-15 00:00`.
pub fn hours(count: u32) -> Vec<Era5DateTime> {
    (0..count)
        .map(|h| Era5DateTime::tavg(1, 15 + h / 24, h % 24).unwrap())
        .collect()
}
