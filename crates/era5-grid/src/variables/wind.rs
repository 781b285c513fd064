//! Wind components and quantities derived from them.

use crate::dataset::Dataset;
use crate::error::Result;

use super::{stored_values, GridVariable, LevelRanges, StorageDtype, VariableDescriptor};

pub const U_WIND: &str = "u_component_of_wind";
pub const V_WIND: &str = "v_component_of_wind";

fn wind_inputs(inputs: &Dataset) -> Result<(&[f32], &[f32])> {
    Ok((inputs.values(U_WIND)?, inputs.values(V_WIND)?))
}

fn derived(name: &str) -> super::DescriptorBuilder {
    VariableDescriptor::builder(name)
        .requires(&[U_WIND, V_WIND])
        .dtype(StorageDtype::Float32)
}

macro_rules! stored_component {
    ($ty:ident, $name:expr, $title:expr, $ranges:expr) => {
        #[derive(Debug, Clone)]
        pub struct $ty {
            descriptor: VariableDescriptor,
            ranges: LevelRanges,
        }

        impl $ty {
            pub fn new() -> Self {
                Self {
                    descriptor: VariableDescriptor::builder($name)
                        .title($title)
                        .unit("m/s")
                        .diverging(true)
                        .build(),
                    ranges: LevelRanges::new($ranges),
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl GridVariable for $ty {
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
    };
}

stored_component!(
    UWind,
    U_WIND,
    "East Wind",
    &[(1000, (-15.0, 15.0)), (150, (-40.0, 70.0))]
);
stored_component!(
    VWind,
    V_WIND,
    "North Wind",
    &[(1000, (-15.0, 15.0)), (150, (-20.0, 20.0))]
);

/// Horizontal wind speed `sqrt(u² + v²)`.
#[derive(Debug, Clone)]
pub struct WindSpeed {
    descriptor: VariableDescriptor,
    ranges: LevelRanges,
}

impl WindSpeed {
    pub fn new() -> Self {
        Self {
            descriptor: derived("wind_speed").unit("m/s").build(),
            ranges: LevelRanges::new(&[(1000, (0.0, 16.0))]),
        }
    }
}

impl Default for WindSpeed {
    fn default() -> Self {
        Self::new()
    }
}

impl GridVariable for WindSpeed {
    fn descriptor(&self) -> &VariableDescriptor {
        &self.descriptor
    }

    fn compute(&self, inputs: &Dataset) -> Result<Vec<f32>> {
        let (u, v) = wind_inputs(inputs)?;
        Ok(u.iter().zip(v).map(|(&u, &v)| u.hypot(v)).collect())
    }

    fn value_range(&self, level: u16) -> Result<(f32, f32)> {
        self.ranges.lookup(self.name(), level)
    }
}

/// Wind direction `atan2(u, v)`: 0 for wind blowing northward, 90° for
/// eastward.
#[derive(Debug, Clone)]
pub struct WindDirection {
    descriptor: VariableDescriptor,
    radians: bool,
}

impl WindDirection {
    pub fn degrees() -> Self {
        Self::new(false)
    }

    pub fn radians() -> Self {
        Self::new(true)
    }

    fn new(radians: bool) -> Self {
        Self {
            descriptor: derived("wind_direction")
                .unit(if radians { "rad" } else { "°" })
                .colormap("twilight")
                .build(),
            radians,
        }
    }
}

impl GridVariable for WindDirection {
    fn descriptor(&self) -> &VariableDescriptor {
        &self.descriptor
    }

    fn compute(&self, inputs: &Dataset) -> Result<Vec<f32>> {
        let (u, v) = wind_inputs(inputs)?;
        Ok(u.iter()
            .zip(v)
            .map(|(&u, &v)| {
                let angle = u.atan2(v);
                if self.radians {
                    angle
                } else {
                    angle.to_degrees()
                }
            })
            .collect())
    }

    /// The full circle at every level.
    fn value_range(&self, _level: u16) -> Result<(f32, f32)> {
        if self.radians {
            Ok((-std::f32::consts::PI, std::f32::consts::PI))
        } else {
            Ok((-180.0, 180.0))
        }
    }
}

/// Horizontal divergence `∂u/∂x + ∂v/∂y` in grid-index units.
///
/// Derivatives are central differences along longitude (x, eastward) and
/// latitude (y, northward) on every level plane, one-sided at the plane
/// edges. ERA5 stores latitudes north to south, so the y derivative is taken
/// against the stored order there. No range is known at any level.
#[derive(Debug, Clone)]
pub struct Divergence {
    descriptor: VariableDescriptor,
    ranges: LevelRanges,
}

impl Divergence {
    pub fn new() -> Self {
        Self {
            descriptor: derived("divergence")
                .unit("s⁻¹")
                .colormap("RdBu")
                .diverging(true)
                .build(),
            ranges: LevelRanges::default(),
        }
    }
}

impl Default for Divergence {
    fn default() -> Self {
        Self::new()
    }
}

/// Gradient of `len` samples spaced `stride` apart starting at `start`,
/// scaled by `sign` and added into `out`.
fn add_gradient(
    values: &[f32],
    out: &mut [f32],
    start: usize,
    len: usize,
    stride: usize,
    sign: f32,
) {
    if len < 2 {
        return;
    }
    let at = |i: usize| values[start + i * stride];
    for i in 0..len {
        let d = if i == 0 {
            at(1) - at(0)
        } else if i == len - 1 {
            at(i) - at(i - 1)
        } else {
            (at(i + 1) - at(i - 1)) / 2.0
        };
        out[start + i * stride] += sign * d;
    }
}

impl GridVariable for Divergence {
    fn descriptor(&self) -> &VariableDescriptor {
        &self.descriptor
    }

    fn compute(&self, inputs: &Dataset) -> Result<Vec<f32>> {
        let (u, v) = wind_inputs(inputs)?;
        let [nt, nl, nlat, nlon] = inputs.shape();
        let latitudes = inputs.latitudes();
        let north_to_south = nlat > 1 && latitudes[nlat - 1] < latitudes[0];
        let y_sign = if north_to_south { -1.0 } else { 1.0 };
        let mut out = vec![0.0; u.len()];

        for plane in 0..nt * nl {
            let base = plane * nlat * nlon;
            for row in 0..nlat {
                add_gradient(u, &mut out, base + row * nlon, nlon, 1, 1.0);
            }
            for col in 0..nlon {
                add_gradient(v, &mut out, base + col, nlat, nlon, y_sign);
            }
        }

        Ok(out)
    }

    fn value_range(&self, level: u16) -> Result<(f32, f32)> {
        self.ranges.lookup(self.name(), level)
    }
}
