//! Coordinate lookup and sub-slicing of datasets.

use era5_common::Era5DateTime;

use crate::dataset::{DataArray, Dataset};
use crate::error::{GridError, Result};
use crate::query::{normalize_longitude, AxisSelection};

/// Tolerance (in coordinate units) for matching a point to a coordinate.
pub const COORDINATE_TOLERANCE: f64 = 1e-4;

fn point_index(axis: &'static str, coords: &[f32], value: f64) -> Result<usize> {
    coords
        .iter()
        .position(|&c| (c as f64 - value).abs() <= COORDINATE_TOLERANCE)
        .ok_or(GridError::CoordinateNotFound { axis, value })
}

fn within(c: f32, low: f64, high: f64) -> bool {
    let c = c as f64;
    c >= low - COORDINATE_TOLERANCE && c <= high + COORDINATE_TOLERANCE
}

fn non_empty(axis: &'static str, indices: Vec<usize>) -> Result<Vec<usize>> {
    if indices.is_empty() {
        return Err(GridError::invalid_query(format!(
            "selection on {} matches no coordinates",
            axis
        )));
    }
    Ok(indices)
}

/// Indices selected on a level or latitude axis, in storage order.
///
/// Range bounds may be given in either order, so a latitude range works
/// against ERA5's north-to-south ordering.
pub fn axis_indices(
    axis: &'static str,
    coords: &[f32],
    selection: &AxisSelection,
) -> Result<Vec<usize>> {
    match *selection {
        AxisSelection::All => Ok((0..coords.len()).collect()),
        AxisSelection::Point(value) => Ok(vec![point_index(axis, coords, value)?]),
        AxisSelection::Range { start, stop } => {
            let (low, high) = if start <= stop { (start, stop) } else { (stop, start) };
            let indices = coords
                .iter()
                .enumerate()
                .filter(|(_, c)| within(**c, low, high))
                .map(|(i, _)| i)
                .collect();
            non_empty(axis, indices)
        }
    }
}

/// Indices selected on the longitude axis.
///
/// Values are wrapped into `[0, 360)` first. A range whose wrapped start is
/// east of its wrapped stop crosses 0°E and yields the eastern part first.
pub fn longitude_indices(coords: &[f32], selection: &AxisSelection) -> Result<Vec<usize>> {
    match *selection {
        AxisSelection::All => Ok((0..coords.len()).collect()),
        AxisSelection::Point(value) => Ok(vec![point_index(
            "longitude",
            coords,
            normalize_longitude(value),
        )?]),
        AxisSelection::Range { start, stop } => {
            if stop - start >= 360.0 {
                return Ok((0..coords.len()).collect());
            }
            let (start, stop) = (normalize_longitude(start), normalize_longitude(stop));

            let indices: Vec<usize> = if start <= stop {
                coords
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| within(**c, start, stop))
                    .map(|(i, _)| i)
                    .collect()
            } else {
                let east = coords
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| within(**c, start, 360.0));
                let west = coords
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| within(**c, 0.0, stop));
                east.chain(west).map(|(i, _)| i).collect()
            };
            non_empty("longitude", indices)
        }
    }
}

impl Dataset {
    /// Position of `instant` on the time axis.
    pub fn time_index(&self, instant: &Era5DateTime) -> Result<usize> {
        self.time
            .iter()
            .position(|t| t == instant)
            .ok_or(GridError::InstantNotFound(*instant))
    }

    /// Sub-dataset holding `names` on the selected levels, latitudes and
    /// longitudes. `time` narrows a multi-time file (daily or monthly) to a
    /// single instant; `None` keeps every time.
    pub fn select<S: AsRef<str>>(
        &self,
        names: &[S],
        time: Option<&Era5DateTime>,
        level: &AxisSelection,
        latitude: &AxisSelection,
        longitude: &AxisSelection,
    ) -> Result<Dataset> {
        let level_idx = axis_indices("level", &self.levels(), level)?;
        let lat_idx = axis_indices("latitude", &self.latitudes(), latitude)?;
        let lon_idx = longitude_indices(&self.longitudes(), longitude)?;

        let time_idx: Vec<usize> = match time {
            Some(instant) => vec![self.time_index(instant)?],
            None => (0..self.time.len()).collect(),
        };

        let [_, nl, nla, nlo] = self.shape();
        let mut cells =
            Vec::with_capacity(time_idx.len() * level_idx.len() * lat_idx.len() * lon_idx.len());
        for &t in &time_idx {
            for &l in &level_idx {
                for &la in &lat_idx {
                    let row = ((t * nl + l) * nla + la) * nlo;
                    cells.extend(lon_idx.iter().map(|&lo| row + lo));
                }
            }
        }

        let mut out = Dataset {
            time: time_idx.iter().map(|&t| self.time[t]).collect(),
            level: self.level.gather(&level_idx),
            latitude: self.latitude.gather(&lat_idx),
            longitude: self.longitude.gather(&lon_idx),
            variables: Default::default(),
            attrs: self.attrs.clone(),
        };

        for name in names {
            let name = name.as_ref();
            let source = self.variable(name)?;
            out.insert_array(
                name,
                DataArray {
                    values: source.values.gather(&cells),
                    attrs: source.attrs.clone(),
                },
            )?;
        }

        Ok(out)
    }
}
