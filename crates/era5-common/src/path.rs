//! ERA5 file naming convention.
//!
//! Files are named `ERA5-{tavg|YYYY}-{MM}{DD}-{HH}00.nc` for hourly data and
//! live in a sub-folder named after their time granularity:
//!
//! ```text
//! hourly/ERA5-tavg-0115-0600.nc
//! daily/ERA5-2020-0115.nc
//! monthly/ERA5-2020-01.nc
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::time::Era5DateTime;

/// Time granularity of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLevel {
    #[default]
    Hour,
    Day,
    Month,
}

impl DataLevel {
    /// Sub-folder holding files of this granularity.
    pub fn folder(&self) -> &'static str {
        match self {
            DataLevel::Hour => "hourly",
            DataLevel::Day => "daily",
            DataLevel::Month => "monthly",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataLevel::Hour => "hour",
            DataLevel::Day => "day",
            DataLevel::Month => "month",
        }
    }

    /// Infer the granularity a textual datetime was written at.
    ///
    /// `"01-15 06:00"` is hourly, `"2020-01-15"` daily, `"01"` monthly.
    /// A bare year has no file granularity and yields `None`.
    pub fn of_datetime_str(s: &str) -> Option<Self> {
        if s.contains(':') {
            return Some(DataLevel::Hour);
        }

        let mut parts: Vec<&str> = s.trim().split('-').collect();
        if parts.first().map(|p| p.len() == 4).unwrap_or(false)
            || parts
                .first()
                .map(|p| p.eq_ignore_ascii_case("TAVG"))
                .unwrap_or(false)
        {
            parts.remove(0);
        }

        match parts.len() {
            2 => Some(DataLevel::Day),
            1 if !parts[0].is_empty() => Some(DataLevel::Month),
            _ => None,
        }
    }
}

impl FromStr for DataLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" | "hourly" => Ok(DataLevel::Hour),
            "day" | "daily" => Ok(DataLevel::Day),
            "month" | "monthly" => Ok(DataLevel::Month),
            other => Err(format!("unknown data level '{}'", other)),
        }
    }
}

impl fmt::Display for DataLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// File name (without folder) for an instant at the given granularity.
pub fn era5_file_name(datetime: &Era5DateTime, level: DataLevel) -> String {
    let year = match datetime.year() {
        Some(year) => format!("{:04}", year),
        None => "tavg".to_string(),
    };

    match level {
        DataLevel::Hour => format!(
            "ERA5-{}-{:02}{:02}-{:02}00.nc",
            year,
            datetime.month(),
            datetime.day(),
            datetime.hour()
        ),
        DataLevel::Day => format!(
            "ERA5-{}-{:02}{:02}.nc",
            year,
            datetime.month(),
            datetime.day()
        ),
        DataLevel::Month => format!("ERA5-{}-{:02}.nc", year, datetime.month()),
    }
}

/// Path of a file relative to the data root, including the granularity folder.
pub fn era5_relative_path(datetime: &Era5DateTime, level: DataLevel) -> PathBuf {
    Path::new(level.folder()).join(era5_file_name(datetime, level))
}

/// Absolute (root-joined) path of a file.
pub fn era5_file_path(root: &Path, datetime: &Era5DateTime, level: DataLevel) -> PathBuf {
    root.join(era5_relative_path(datetime, level))
}

/// Whether the file for an instant exists on the local filesystem.
pub fn era5_file_exists(root: &Path, datetime: &Era5DateTime, level: DataLevel) -> bool {
    era5_file_path(root, datetime, level).is_file()
}
