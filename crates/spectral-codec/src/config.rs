//! Configuration for the spectral codec.

use serde::{Deserialize, Serialize};

use crate::deflate::DeflateStrategy;

/// Default amplitude quantile below which coefficients are dropped.
pub const DEFAULT_QUANTILE: f64 = 0.75;

/// Configuration for sparse spectrum encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Amplitude quantile used as the retention cutoff (0..=1).
    /// Higher values keep fewer coefficients.
    pub quantile: f64,

    /// Deflate strategy for the f16 real/imaginary value buffers.
    pub value_strategy: DeflateStrategy,

    /// Deflate strategy for the delta-coded coordinate buffers.
    pub index_strategy: DeflateStrategy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            quantile: DEFAULT_QUANTILE,
            value_strategy: DeflateStrategy::Default,
            index_strategy: DeflateStrategy::Filtered,
        }
    }
}

impl CodecConfig {
    /// Default configuration with a different quantile.
    pub fn with_quantile(quantile: f64) -> Self {
        Self {
            quantile,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SPECTRAL_QUANTILE") {
            if let Ok(quantile) = val.parse() {
                config.quantile = quantile;
            }
        }

        if let Ok(val) = std::env::var("SPECTRAL_VALUE_STRATEGY") {
            if let Ok(strategy) = val.parse() {
                config.value_strategy = strategy;
            }
        }

        if let Ok(val) = std::env::var("SPECTRAL_INDEX_STRATEGY") {
            if let Ok(strategy) = val.parse() {
                config.index_strategy = strategy;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.quantile) {
            return Err(format!("quantile must be within [0, 1], got {}", self.quantile));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.quantile, 0.75);
        assert_eq!(config.value_strategy, DeflateStrategy::Default);
        assert_eq!(config.index_strategy, DeflateStrategy::Filtered);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_quantile() {
        assert!(CodecConfig::with_quantile(1.5).validate().is_err());
        assert!(CodecConfig::with_quantile(-0.1).validate().is_err());
        assert!(CodecConfig::with_quantile(f64::NAN).validate().is_err());
        assert!(CodecConfig::with_quantile(1.0).validate().is_ok());
    }

    #[test]
    fn test_from_env_keeps_default_on_unknown_strategy() {
        std::env::set_var("SPECTRAL_VALUE_STRATEGY", "RLE");
        std::env::set_var("SPECTRAL_INDEX_STRATEGY", "zstd");
        let config = CodecConfig::from_env();
        std::env::remove_var("SPECTRAL_VALUE_STRATEGY");
        std::env::remove_var("SPECTRAL_INDEX_STRATEGY");

        assert_eq!(config.value_strategy, DeflateStrategy::Rle);
        assert_eq!(config.index_strategy, DeflateStrategy::Filtered);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{"quantile": 0.9, "value_strategy": "rle", "index_strategy": "filtered"}"#;
        let config: CodecConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.quantile, 0.9);
        assert_eq!(config.value_strategy, DeflateStrategy::Rle);
    }
}
