//! Configuration for variable resolution.

use std::path::PathBuf;

use chrono::Duration;
use era5_common::DataLevel;
use serde::{Deserialize, Serialize};

/// Configuration for a [`VariableResolver`](crate::VariableResolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Root folder holding the `hourly/`, `daily/` and `monthly/` trees.
    pub data_dir: PathBuf,

    /// Granularity of the files queries are resolved against.
    pub data_level: DataLevel,

    /// Maximum number of opened datasets kept in memory.
    pub dataset_cache_size: usize,

    /// Worker threads used to resolve time ranges.
    pub worker_threads: usize,

    /// Step between instants when a query leaves time unset.
    pub climatology_step_hours: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            data_level: DataLevel::Hour,
            dataset_cache_size: 64,
            worker_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            climatology_step_hours: 1,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ERA5_DATA_DIR") {
            config.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("ERA5_DATA_LEVEL") {
            if let Ok(level) = val.parse() {
                config.data_level = level;
            }
        }

        if let Ok(val) = std::env::var("ERA5_DATASET_CACHE_SIZE") {
            if let Ok(size) = val.parse() {
                config.dataset_cache_size = size;
            }
        }

        if let Ok(val) = std::env::var("ERA5_WORKER_THREADS") {
            if let Ok(threads) = val.parse() {
                config.worker_threads = threads;
            }
        }

        if let Ok(val) = std::env::var("ERA5_CLIMATOLOGY_STEP_HOURS") {
            if let Ok(hours) = val.parse() {
                config.climatology_step_hours = hours;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.dataset_cache_size == 0 {
            return Err("dataset_cache_size must be > 0".to_string());
        }

        if self.worker_threads == 0 {
            return Err("worker_threads must be > 0".to_string());
        }

        if self.climatology_step_hours == 0 {
            return Err("climatology_step_hours must be > 0".to_string());
        }

        Ok(())
    }

    pub fn climatology_step(&self) -> Duration {
        Duration::hours(self.climatology_step_hours as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.data_level, DataLevel::Hour);
        assert_eq!(config.dataset_cache_size, 64);
        assert!(config.worker_threads > 0);
        assert_eq!(config.climatology_step(), Duration::hours(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "data_dir": "/mnt/era5",
            "data_level": "day",
            "dataset_cache_size": 8,
            "worker_threads": 2,
            "climatology_step_hours": 6
        }"#;
        let config: ResolverConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/mnt/era5"));
        assert_eq!(config.data_level, DataLevel::Day);
        assert_eq!(config.climatology_step(), Duration::hours(6));
    }

    #[test]
    fn test_validate() {
        let config = ResolverConfig {
            climatology_step_hours: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ResolverConfig {
            worker_threads: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
