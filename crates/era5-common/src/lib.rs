//! Common types and utilities shared across the ERA5 crates.

pub mod bytes;
pub mod path;
pub mod time;
pub mod units;

pub use bytes::format_bytes;
pub use path::{era5_file_exists, era5_file_name, era5_file_path, era5_relative_path, DataLevel};
pub use time::{
    climatology_range, datetime_range, DateTimeRange, Era5DateTime, TimeParseError,
    TAVG_REFERENCE_YEAR,
};
pub use units::{coordinate_dtype, format_unit, units_of, CoordinateDtype};
