//! Construction of climatological grid files from a reanalysis source.
//!
//! For every climatological instant, the same calendar instant is read for
//! each year of a span, the variables are averaged across years, and the
//! result is optionally packed and written under the naming convention.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use era5_common::{era5_file_path, DataLevel, Era5DateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::error::{GridError, Result};
use crate::pack::compress_dataset;
use crate::store::{GridStore, ReanalysisSource};

/// Average `variables` at `instant` over every year in `years`.
///
/// All yearly datasets must share their grid. The result is stamped with
/// the climatological instant and flagged as time-averaged.
pub fn time_average(
    source: &dyn ReanalysisSource,
    variables: &[String],
    instant: &Era5DateTime,
    years: RangeInclusive<i32>,
) -> Result<Dataset> {
    let tavg = instant.as_tavg()?;
    let mut first: Option<Dataset> = None;
    let mut sums: Vec<Vec<f64>> = Vec::new();
    let mut count = 0usize;

    for year in years.clone() {
        let calendar = Era5DateTime::new(year, tavg.month(), tavg.day(), tavg.hour())?;
        let dataset = source.read(variables, &calendar)?;

        match &first {
            Some(reference) => {
                if reference.shape()[1..] != dataset.shape()[1..] {
                    return Err(GridError::invalid_query(format!(
                        "grid of {} differs from earlier years",
                        calendar
                    )));
                }
                for (sum, name) in sums.iter_mut().zip(variables) {
                    for (acc, &v) in sum.iter_mut().zip(dataset.values(name)?) {
                        *acc += v as f64;
                    }
                }
            }
            None => {
                sums = variables
                    .iter()
                    .map(|name| -> Result<Vec<f64>> {
                        Ok(dataset.values(name)?.iter().map(|&v| v as f64).collect())
                    })
                    .collect::<Result<_>>()?;
            }
        }
        if first.is_none() {
            first = Some(dataset);
        }
        count += 1;
    }

    let reference = first.ok_or_else(|| {
        GridError::invalid_query(format!(
            "empty year span {}..={}",
            years.start(),
            years.end()
        ))
    })?;

    let mut averaged = Dataset::new(
        vec![tavg],
        reference.levels(),
        reference.latitudes(),
        reference.longitudes(),
    );
    for (name, sum) in variables.iter().zip(sums) {
        averaged.insert(
            name.clone(),
            sum.into_iter().map(|v| (v / count as f64) as f32).collect(),
        )?;
    }

    debug!(instant = %tavg, years = count, "Averaged instant");
    Ok(averaged)
}

/// What to do with instants that cannot or need not be produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPolicy {
    /// Leave outputs that already exist untouched instead of overwriting.
    pub skip_existing: bool,
    /// Skip instants whose source data is missing instead of aborting.
    pub skip_missing: bool,
}

/// Configuration for an ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    pub variables: Vec<String>,
    pub first_year: i32,
    pub last_year: i32,
    pub output_dir: PathBuf,
    pub data_level: DataLevel,
    pub policy: BatchPolicy,
    /// Store variables as packed f16.
    pub pack: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            variables: vec![
                "temperature".to_string(),
                "u_component_of_wind".to_string(),
                "v_component_of_wind".to_string(),
                "vertical_velocity".to_string(),
            ],
            first_year: 1991,
            last_year: 2020,
            output_dir: PathBuf::from("data"),
            data_level: DataLevel::Hour,
            policy: BatchPolicy::default(),
            pack: true,
        }
    }
}

impl IngestConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.variables.is_empty() {
            return Err("at least one variable is required".to_string());
        }

        if self.first_year > self.last_year {
            return Err(format!(
                "first_year ({}) is after last_year ({})",
                self.first_year, self.last_year
            ));
        }

        Ok(())
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Paths written, in processing order.
    pub written: Vec<PathBuf>,
    /// Existing outputs left in place.
    pub skipped_existing: Vec<PathBuf>,
    /// Instants without source data.
    pub skipped_missing: Vec<Era5DateTime>,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

impl IngestReport {
    /// Number of instants handled, written or skipped.
    pub fn processed(&self) -> usize {
        self.written.len() + self.skipped_existing.len() + self.skipped_missing.len()
    }
}

/// Builds and stores climatological grid files.
pub struct Ingestor {
    source: Arc<dyn ReanalysisSource>,
    store: Arc<dyn GridStore>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(
        source: Arc<dyn ReanalysisSource>,
        store: Arc<dyn GridStore>,
        config: IngestConfig,
    ) -> Result<Self> {
        config.validate().map_err(GridError::config)?;
        Ok(Self {
            source,
            store,
            config,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Process `instants` in order.
    ///
    /// `cancel` is checked before each instant; once set, the run stops and
    /// reports what was done so far. Any failure not covered by the batch
    /// policy aborts the run.
    pub fn run(&self, instants: &[Era5DateTime], cancel: &AtomicBool) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let policy = self.config.policy;

        for instant in instants {
            if cancel.load(Ordering::Relaxed) {
                info!(processed = report.processed(), "Ingestion cancelled");
                report.cancelled = true;
                break;
            }

            let tavg = instant.as_tavg()?;
            let path = era5_file_path(&self.config.output_dir, &tavg, self.config.data_level);

            if self.store.exists(&path) {
                if policy.skip_existing {
                    debug!(path = %path.display(), "Output exists, skipping");
                    report.skipped_existing.push(path);
                    continue;
                }
                warn!(path = %path.display(), "Overwriting existing output");
            }

            let dataset = match time_average(
                self.source.as_ref(),
                &self.config.variables,
                &tavg,
                self.config.years(),
            ) {
                Ok(dataset) => dataset,
                Err(e) if e.is_not_found() && policy.skip_missing => {
                    warn!(instant = %tavg, error = %e, "Source data missing, skipping");
                    report.skipped_missing.push(tavg);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let dataset = if self.config.pack {
                compress_dataset(&dataset)
            } else {
                dataset
            };

            let written = self.store.write(
                &dataset,
                &self.config.output_dir,
                self.config.data_level,
            )?;
            report.written.push(written);
        }

        info!(
            written = report.written.len(),
            skipped_existing = report.skipped_existing.len(),
            skipped_missing = report.skipped_missing.len(),
            cancelled = report.cancelled,
            "Ingestion finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every year holds `year - 2000` in every cell.
    struct YearSource;

    impl ReanalysisSource for YearSource {
        fn read(&self, variables: &[String], instant: &Era5DateTime) -> Result<Dataset> {
            let mut ds = Dataset::new(vec![*instant], vec![1000.0], vec![0.0], vec![0.0, 180.0]);
            let value = instant.year().unwrap_or(0) as f32 - 2000.0;
            for name in variables {
                ds.insert(name.clone(), vec![value; 2])?;
            }
            Ok(ds)
        }
    }

    #[test]
    fn test_time_average() {
        let variables = vec!["temperature".to_string()];
        let instant = Era5DateTime::tavg(7, 4, 12).unwrap();
        let ds = time_average(&YearSource, &variables, &instant, 2001..=2004).unwrap();
        assert_eq!(ds.values("temperature").unwrap(), &[2.5, 2.5]);
        assert!(ds.is_tavg());
        assert_eq!(ds.time, vec![instant]);
    }

    #[test]
    fn test_calendar_instant_becomes_tavg() {
        let variables = vec!["temperature".to_string()];
        let instant = Era5DateTime::new(1999, 7, 4, 12).unwrap();
        let ds = time_average(&YearSource, &variables, &instant, 2010..=2010).unwrap();
        assert!(ds.time[0].is_tavg());
        assert_eq!(ds.values("temperature").unwrap(), &[10.0, 10.0]);
    }

    #[test]
    fn test_empty_year_span() {
        let instant = Era5DateTime::tavg(1, 1, 0).unwrap();
        #[allow(clippy::reversed_empty_ranges)]
        let result = time_average(&YearSource, &["temperature".to_string()], &instant, 2020..=2010);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(IngestConfig::default().validate().is_ok());
        let config = IngestConfig {
            first_year: 2021,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
