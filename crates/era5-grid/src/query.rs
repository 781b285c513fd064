//! Grid queries: which instants, levels, latitudes and longitudes to read.

use chrono::Duration;
use era5_common::{climatology_range, datetime_range, Era5DateTime};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Wrap a longitude into `[0, 360)`.
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Selection along a level, latitude or longitude axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AxisSelection {
    /// Every coordinate on the axis.
    #[default]
    All,
    /// The coordinate equal to this value.
    Point(f64),
    /// Coordinates between the bounds, inclusive.
    Range { start: f64, stop: f64 },
}

impl AxisSelection {
    pub fn point(value: f64) -> Self {
        Self::Point(value)
    }

    pub fn range(start: f64, stop: f64) -> Self {
        Self::Range { start, stop }
    }
}

/// Selection along the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimeSelection {
    /// The full climatological year.
    #[default]
    Climatology,
    Instant(Era5DateTime),
    /// Inclusive range of instants separated by `step`.
    Range {
        start: Era5DateTime,
        stop: Era5DateTime,
        step: Duration,
    },
}

impl TimeSelection {
    /// Hourly range between two instants.
    pub fn hourly(start: Era5DateTime, stop: Era5DateTime) -> Self {
        Self::Range {
            start,
            stop,
            step: Duration::hours(1),
        }
    }

    /// Expand to the ordered list of instants to read.
    pub fn instants(&self, climatology_step: Duration) -> Result<Vec<Era5DateTime>> {
        let instants = match *self {
            Self::Instant(instant) => vec![instant],
            Self::Range { start, stop, step } => {
                if start.is_tavg() != stop.is_tavg() {
                    return Err(GridError::invalid_query(format!(
                        "cannot mix climatological and calendar instants ({} .. {})",
                        start, stop
                    )));
                }
                datetime_range(start, stop, step)?
            }
            Self::Climatology => climatology_range(climatology_step)?.collect(),
        };

        if instants.is_empty() {
            return Err(GridError::invalid_query("time selection is empty"));
        }
        Ok(instants)
    }
}

/// A request for a 4D slice of a variable.
///
/// Every axis defaults to "all"; an unset time means the climatological
/// year.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridQuery {
    pub time: TimeSelection,
    pub level: AxisSelection,
    pub latitude: AxisSelection,
    pub longitude: AxisSelection,
}

impl GridQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for one instant.
    pub fn at(instant: Era5DateTime) -> Self {
        Self::new().time(TimeSelection::Instant(instant))
    }

    pub fn time(mut self, time: TimeSelection) -> Self {
        self.time = time;
        self
    }

    pub fn level(mut self, level: AxisSelection) -> Self {
        self.level = level;
        self
    }

    pub fn latitude(mut self, latitude: AxisSelection) -> Self {
        self.latitude = latitude;
        self
    }

    pub fn longitude(mut self, longitude: AxisSelection) -> Self {
        self.longitude = longitude;
        self
    }
}
