//! Resolved 4D slices of a variable.

use era5_common::Era5DateTime;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Values of one variable on a `(time, level, latitude, longitude)` grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSlice {
    pub name: String,
    pub unit: String,
    pub time: Vec<Era5DateTime>,
    pub level: Vec<f32>,
    pub latitude: Vec<f32>,
    pub longitude: Vec<f32>,
    /// Row-major values.
    pub values: Vec<f32>,
}

impl GridSlice {
    pub fn shape(&self) -> [usize; 4] {
        [
            self.time.len(),
            self.level.len(),
            self.latitude.len(),
            self.longitude.len(),
        ]
    }

    /// Lengths of the axes longer than one, keeping at least one axis.
    pub fn squeezed_shape(&self) -> Vec<usize> {
        let shape: Vec<usize> = self.shape().into_iter().filter(|&n| n > 1).collect();
        if shape.is_empty() {
            vec![self.values.len().min(1)]
        } else {
            shape
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `(time, level, latitude, longitude)` indices.
    pub fn get(&self, t: usize, l: usize, la: usize, lo: usize) -> Option<f32> {
        let [nt, nl, nla, nlo] = self.shape();
        if t >= nt || l >= nl || la >= nla || lo >= nlo {
            return None;
        }
        self.values.get(((t * nl + l) * nla + la) * nlo + lo).copied()
    }

    /// The latitude/longitude plane at one time and level index.
    pub fn plane(&self, t: usize, l: usize) -> Option<&[f32]> {
        let [nt, nl, nla, nlo] = self.shape();
        if t >= nt || l >= nl {
            return None;
        }
        let size = nla * nlo;
        let start = (t * nl + l) * size;
        self.values.get(start..start + size)
    }

    /// Concatenate slices along time, in the given order.
    ///
    /// All parts must share variable and spatial coordinates.
    pub fn concat_time(parts: Vec<GridSlice>) -> Result<GridSlice> {
        let mut iter = parts.into_iter();
        let mut out = iter
            .next()
            .ok_or_else(|| GridError::invalid_query("nothing to concatenate"))?;

        for part in iter {
            if part.name != out.name
                || part.level != out.level
                || part.latitude != out.latitude
                || part.longitude != out.longitude
            {
                return Err(GridError::invalid_query(format!(
                    "cannot concatenate slice at {:?} with different coordinates",
                    part.time.first()
                )));
            }
            out.time.extend(part.time);
            out.values.extend(part.values);
        }

        Ok(out)
    }
}
