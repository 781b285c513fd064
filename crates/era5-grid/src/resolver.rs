//! Resolution of variable queries against stored grid files.
//!
//! A query names a variable and a [`GridQuery`]. The time selection is
//! expanded to an ordered list of instants; each instant maps to one file,
//! which is read through the [`DatasetCache`], unpacked, cut down to the
//! requested levels, latitudes and longitudes, and handed to the variable
//! to compute its values. Multiple instants are resolved on a worker pool
//! and concatenated in chronological order.

use std::path::PathBuf;
use std::sync::Arc;

use era5_common::{era5_file_path, Era5DateTime};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use spectral_codec::CacheStats;
use tracing::{debug, info};

use crate::cache::DatasetCache;
use crate::config::ResolverConfig;
use crate::error::{GridError, Result};
use crate::pack::decompress_dataset;
use crate::query::GridQuery;
use crate::registry::VariableRegistry;
use crate::slice::GridSlice;
use crate::store::GridReader;
use crate::variables::{GridVariable, VariableDescriptor};

/// Resolves registered variables on stored grids.
pub struct VariableResolver {
    registry: VariableRegistry,
    reader: Arc<dyn GridReader>,
    cache: DatasetCache,
    config: ResolverConfig,
    pool: ThreadPool,
}

impl VariableResolver {
    pub fn new(
        registry: VariableRegistry,
        reader: Arc<dyn GridReader>,
        config: ResolverConfig,
    ) -> Result<Self> {
        config.validate().map_err(GridError::config)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("era5-resolver-{}", i))
            .build()
            .map_err(|e| GridError::config(format!("failed to build worker pool: {}", e)))?;

        Ok(Self {
            registry,
            reader,
            cache: DatasetCache::new(config.dataset_cache_size),
            config,
            pool,
        })
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn descriptor(&self, name: &str) -> Result<VariableDescriptor> {
        self.registry.descriptor(name)
    }

    /// Display range of a variable at a pressure level.
    pub fn value_range(&self, name: &str, level: u16) -> Result<(f32, f32)> {
        self.registry.get(name)?.value_range(level)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Path of the file holding `instant`.
    pub fn path_for(&self, instant: &Era5DateTime) -> PathBuf {
        era5_file_path(&self.config.data_dir, instant, self.config.data_level)
    }

    /// Resolve `name` on the grid selected by `query`.
    pub fn get(&self, name: &str, query: &GridQuery) -> Result<GridSlice> {
        let variable = self.registry.get(name)?;
        let instants = query.time.instants(self.config.climatology_step())?;

        if let [instant] = instants.as_slice() {
            return self.resolve_instant(variable.as_ref(), instant, query);
        }

        info!(
            variable = %name,
            instants = instants.len(),
            first = %instants[0],
            "Resolving time range"
        );

        // Collecting an indexed parallel iterator keeps input order.
        let parts = self.pool.install(|| {
            instants
                .par_iter()
                .map(|instant| self.resolve_instant(variable.as_ref(), instant, query))
                .collect::<Result<Vec<_>>>()
        })?;

        GridSlice::concat_time(parts)
    }

    fn resolve_instant(
        &self,
        variable: &dyn GridVariable,
        instant: &Era5DateTime,
        query: &GridQuery,
    ) -> Result<GridSlice> {
        let path = self.path_for(instant);
        let dataset = self
            .cache
            .get_or_load(&path, || Ok(decompress_dataset(self.reader.read(&path)?)))?;

        let inputs = dataset.select(
            variable.requires(),
            Some(instant),
            &query.level,
            &query.latitude,
            &query.longitude,
        )?;
        let values = variable.compute(&inputs)?;

        debug!(
            variable = %variable.name(),
            instant = %instant,
            cells = values.len(),
            "Resolved instant"
        );

        Ok(GridSlice {
            name: variable.name().to_string(),
            unit: variable.unit().to_string(),
            time: inputs.time.clone(),
            level: inputs.levels(),
            latitude: inputs.latitudes(),
            longitude: inputs.longitudes(),
            values,
        })
    }
}
