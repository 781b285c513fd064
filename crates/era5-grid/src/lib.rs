//! Typed 4D access to ERA5 pressure-level grids.
//!
//! Stored grid files hold temperature, wind components and vertical
//! velocity on a `(time, level, latitude, longitude)` grid, optionally
//! packed as f16. This crate resolves registered variables, stored or
//! derived, on any sub-grid of those files:
//!
//! ```text
//! VariableResolver::get(name, GridQuery)
//!      │
//!      ├─► Expand the time selection into ordered instants
//!      │
//!      ├─► Per instant (worker pool for ranges):
//!      │      ├─► DatasetCache hit, or GridReader::read + decompress_dataset
//!      │      ├─► Dataset::select(requires, level, latitude, longitude)
//!      │      └─► GridVariable::compute
//!      │
//!      └─► GridSlice::concat_time, in chronological order
//! ```
//!
//! Resolved slices can be fitted with a [`SpectralModel`] to measure how
//! well the sparse spectral codec represents them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use era5_grid::{AxisSelection, GridQuery, MemoryStore, ResolverConfig, VariableRegistry, VariableResolver};
//!
//! let store = Arc::new(MemoryStore::new());
//! let resolver = VariableResolver::new(VariableRegistry::era5(), store, ResolverConfig::from_env())?;
//!
//! // Wind speed at 850 hPa over the whole climatological year
//! let query = GridQuery::new().level(AxisSelection::point(850.0));
//! let slice = resolver.get("wind_speed", &query)?;
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod model;
pub mod pack;
pub mod query;
pub mod registry;
pub mod resolver;
pub mod select;
pub mod slice;
pub mod store;
pub mod variables;

// Re-export commonly used types at crate root
pub use cache::DatasetCache;
pub use config::ResolverConfig;
pub use dataset::{ArrayValues, DataArray, Dataset, ATTR_IS_FLOAT16, ATTR_IS_TAVG};
pub use error::{GridError, Result};
pub use ingest::{time_average, BatchPolicy, IngestConfig, IngestReport, Ingestor};
pub use model::{evaluate, Evaluation, ModelReport, SpectralModel};
pub use pack::{compress_dataset, decompress_dataset};
pub use query::{normalize_longitude, AxisSelection, GridQuery, TimeSelection};
pub use registry::VariableRegistry;
pub use resolver::VariableResolver;
pub use select::COORDINATE_TOLERANCE;
pub use slice::GridSlice;
pub use store::{GridReader, GridStore, GridWriter, MemoryStore, ReanalysisSource};
pub use variables::{GridVariable, VariableDescriptor};
