//! Temperature and vertical velocity.

use crate::dataset::Dataset;
use crate::error::Result;

use super::{stored_values, GridVariable, LevelRanges, VariableDescriptor};

/// Offset between Kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f32 = 273.15;

const TEMPERATURE_GRADIENT: [&str; 9] = [
    "#d7e4fc", "#5fb1d4", "#4e9bc8", "#466ae1", "#6b1966", "#952c5e", "#d12d3e", "#fa7532",
    "#f5d25f",
];

/// Air temperature, stored in Kelvin.
#[derive(Debug, Clone)]
pub struct Temperature {
    descriptor: VariableDescriptor,
    celsius: bool,
    ranges: LevelRanges,
}

impl Temperature {
    /// Temperature in Kelvin.
    pub fn kelvin() -> Self {
        Self::new(false)
    }

    /// Temperature converted to degrees Celsius.
    pub fn celsius() -> Self {
        Self::new(true)
    }

    fn new(celsius: bool) -> Self {
        let kelvin_ranges = LevelRanges::new(&[(1000, (230.0, 310.0)), (150, (200.0, 230.0))]);
        Self {
            descriptor: VariableDescriptor::builder("temperature")
                .unit(if celsius { "°C" } else { "K" })
                .gradient(&TEMPERATURE_GRADIENT)
                .build(),
            celsius,
            ranges: if celsius {
                kelvin_ranges.shifted(-KELVIN_OFFSET)
            } else {
                kelvin_ranges
            },
        }
    }
}

impl GridVariable for Temperature {
    fn descriptor(&self) -> &VariableDescriptor {
        &self.descriptor
    }

    fn compute(&self, inputs: &Dataset) -> Result<Vec<f32>> {
        let values = stored_values(self, inputs)?;
        if self.celsius {
            Ok(values.iter().map(|&k| k - KELVIN_OFFSET).collect())
        } else {
            Ok(values.to_vec())
        }
    }

    fn value_range(&self, level: u16) -> Result<(f32, f32)> {
        self.ranges.lookup(self.name(), level)
    }
}

/// Vertical velocity (omega) in Pa/s; positive values are descending air.
#[derive(Debug, Clone)]
pub struct VerticalVelocity {
    descriptor: VariableDescriptor,
    ranges: LevelRanges,
}

impl VerticalVelocity {
    pub fn new() -> Self {
        Self {
            descriptor: VariableDescriptor::builder("vertical_velocity")
                .unit("Pa/s")
                .colormap("RdBu")
                .diverging(true)
                .build(),
            ranges: LevelRanges::new(&[(1000, (-1.5, 1.5))]),
        }
    }
}

impl Default for VerticalVelocity {
    fn default() -> Self {
        Self::new()
    }
}

impl GridVariable for VerticalVelocity {
    fn descriptor(&self) -> &VariableDescriptor {
        &self.descriptor
    }

    fn compute(&self, inputs: &Dataset) -> Result<Vec<f32>> {
        Ok(stored_values(self, inputs)?.to_vec())
    }

    fn value_range(&self, level: u16) -> Result<(f32, f32)> {
        self.ranges.lookup(self.name(), level)
    }
}
