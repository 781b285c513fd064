//! Unit and storage metadata for ERA5 variables and coordinates.

use serde::{Deserialize, Serialize};

/// Storage type of a coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateDtype {
    Int16,
    Float32,
}

/// Physical units of a stored variable or coordinate, if known.
pub fn units_of(name: &str) -> Option<&'static str> {
    match name {
        "u_component_of_wind" | "v_component_of_wind" => Some("m/s"),
        "temperature" => Some("K"),
        "vertical_velocity" => Some("Pa/s"),
        "level" => Some("hPa"),
        "longitude" => Some("degrees east"),
        "latitude" => Some("degrees north"),
        _ => None,
    }
}

/// Storage dtype for a coordinate axis. Pressure levels are whole hPa.
pub fn coordinate_dtype(name: &str) -> CoordinateDtype {
    match name {
        "level" => CoordinateDtype::Int16,
        _ => CoordinateDtype::Float32,
    }
}

/// Render a unit string for display next to a number (`"K"` → `" K"`).
///
/// Degree-like units attach directly to the value.
pub fn format_unit(unit: &str) -> String {
    if unit.is_empty() || unit.starts_with('°') {
        unit.to_string()
    } else {
        format!(" {}", unit)
    }
}
