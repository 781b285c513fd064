//! Stored and derived atmospheric variables.
//!
//! Every variable implements [`GridVariable`]: it carries a
//! [`VariableDescriptor`] and maps a dataset holding its required stored
//! variables to its own values.

pub mod descriptor;
pub mod thermo;
pub mod wind;

pub use descriptor::{Colormap, DescriptorBuilder, StorageDtype, VariableDescriptor};
pub use thermo::{Temperature, VerticalVelocity};
pub use wind::{Divergence, UWind, VWind, WindDirection, WindSpeed};

use crate::dataset::Dataset;
use crate::error::{GridError, Result};

/// A variable that can be resolved on a grid.
pub trait GridVariable: Send + Sync {
    fn descriptor(&self) -> &VariableDescriptor;

    /// Values for every cell of `inputs`, which holds the required stored
    /// variables on a `(time, level, latitude, longitude)` grid.
    fn compute(&self, inputs: &Dataset) -> Result<Vec<f32>>;

    /// Display range `(min, max)` at a pressure level.
    fn value_range(&self, level: u16) -> Result<(f32, f32)>;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    fn unit(&self) -> &str {
        &self.descriptor().unit
    }

    fn requires(&self) -> &[String] {
        &self.descriptor().requires
    }
}

/// Display ranges keyed by pressure level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelRanges(Vec<(u16, (f32, f32))>);

impl LevelRanges {
    pub fn new(ranges: &[(u16, (f32, f32))]) -> Self {
        Self(ranges.to_vec())
    }

    /// Every range moved by `offset`.
    pub fn shifted(&self, offset: f32) -> Self {
        Self(
            self.0
                .iter()
                .map(|&(level, (lo, hi))| (level, (lo + offset, hi + offset)))
                .collect(),
        )
    }

    pub fn lookup(&self, variable: &str, level: u16) -> Result<(f32, f32)> {
        self.0
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, range)| *range)
            .ok_or_else(|| GridError::UnknownLevel {
                variable: variable.to_string(),
                level,
            })
    }
}

/// Stored values of the variable's own name.
pub(crate) fn stored_values<'a>(variable: &dyn GridVariable, inputs: &'a Dataset) -> Result<&'a [f32]> {
    inputs.values(variable.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ranges() {
        let ranges = LevelRanges::new(&[(1000, (-15.0, 15.0)), (150, (-40.0, 70.0))]);
        assert_eq!(ranges.lookup("u", 150).unwrap(), (-40.0, 70.0));
        assert!(matches!(
            ranges.lookup("u", 500),
            Err(GridError::UnknownLevel { level: 500, .. })
        ));
        assert_eq!(ranges.shifted(1.0).lookup("u", 1000).unwrap(), (-14.0, 16.0));
    }
}
