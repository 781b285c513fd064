//! In-memory ERA5 pressure-level datasets.
//!
//! A [`Dataset`] holds the contents of one grid file: time, level, latitude
//! and longitude coordinates, any number of data variables laid out as
//! row-major `(time, level, latitude, longitude)` arrays, and a string
//! attribute map.

use std::collections::BTreeMap;

use era5_common::{units_of, CoordinateDtype, Era5DateTime};

use crate::error::{GridError, Result};

/// Attribute set on datasets whose variables are packed f16 bit patterns.
pub const ATTR_IS_FLOAT16: &str = "is_float16";

/// Attribute set on climatological (time-averaged) datasets.
pub const ATTR_IS_TAVG: &str = "is_tavg";

/// Values of a coordinate axis or data variable.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    Float32(Vec<f32>),
    Int16(Vec<i16>),
}

impl ArrayValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(values) => values.len(),
            Self::Int16(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> CoordinateDtype {
        match self {
            Self::Float32(_) => CoordinateDtype::Float32,
            Self::Int16(_) => CoordinateDtype::Int16,
        }
    }

    /// Numeric conversion to f32. For packed data variables this yields the
    /// raw integers, not the f16 values they encode.
    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            Self::Float32(values) => values.clone(),
            Self::Int16(values) => values.iter().map(|&v| v as f32).collect(),
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::Float32(values) => Some(values),
            Self::Int16(_) => None,
        }
    }

    /// Values at `indices`, in that order.
    pub fn gather(&self, indices: &[usize]) -> Self {
        match self {
            Self::Float32(values) => Self::Float32(indices.iter().map(|&i| values[i]).collect()),
            Self::Int16(values) => Self::Int16(indices.iter().map(|&i| values[i]).collect()),
        }
    }
}

impl From<Vec<f32>> for ArrayValues {
    fn from(values: Vec<f32>) -> Self {
        Self::Float32(values)
    }
}

impl From<Vec<i16>> for ArrayValues {
    fn from(values: Vec<i16>) -> Self {
        Self::Int16(values)
    }
}

/// A data variable.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    pub values: ArrayValues,
    pub attrs: BTreeMap<String, String>,
}

impl DataArray {
    pub fn new(values: impl Into<ArrayValues>) -> Self {
        Self {
            values: values.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn units(&self) -> Option<&str> {
        self.attrs.get("units").map(String::as_str)
    }
}

/// Contents of one ERA5 grid file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub time: Vec<Era5DateTime>,
    pub level: ArrayValues,
    pub latitude: ArrayValues,
    pub longitude: ArrayValues,
    pub(crate) variables: BTreeMap<String, DataArray>,
    pub attrs: BTreeMap<String, String>,
}

impl Dataset {
    /// Create an empty dataset on the given coordinates.
    pub fn new(
        time: Vec<Era5DateTime>,
        level: Vec<f32>,
        latitude: Vec<f32>,
        longitude: Vec<f32>,
    ) -> Self {
        let mut attrs = BTreeMap::new();
        if !time.is_empty() && time.iter().all(Era5DateTime::is_tavg) {
            attrs.insert(ATTR_IS_TAVG.to_string(), "true".to_string());
        }

        Self {
            time,
            level: ArrayValues::Float32(level),
            latitude: ArrayValues::Float32(latitude),
            longitude: ArrayValues::Float32(longitude),
            variables: BTreeMap::new(),
            attrs,
        }
    }

    /// `(time, level, latitude, longitude)` lengths.
    pub fn shape(&self) -> [usize; 4] {
        [
            self.time.len(),
            self.level.len(),
            self.latitude.len(),
            self.longitude.len(),
        ]
    }

    /// Number of cells in every data variable.
    pub fn cell_count(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn levels(&self) -> Vec<f32> {
        self.level.to_f32()
    }

    pub fn latitudes(&self) -> Vec<f32> {
        self.latitude.to_f32()
    }

    pub fn longitudes(&self) -> Vec<f32> {
        self.longitude.to_f32()
    }

    /// Add an f32 variable, tagging it with its known units.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f32>) -> Result<()> {
        let name = name.into();
        let mut array = DataArray::new(values);
        if let Some(units) = units_of(&name) {
            array.attrs.insert("units".to_string(), units.to_string());
        }
        self.insert_array(name, array)
    }

    /// Add a variable of any storage type.
    pub fn insert_array(&mut self, name: impl Into<String>, array: DataArray) -> Result<()> {
        let name = name.into();
        let expected = self.cell_count();
        if array.values.len() != expected {
            return Err(GridError::ShapeMismatch {
                name,
                expected,
                actual: array.values.len(),
            });
        }
        self.variables.insert(name, array);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Result<&DataArray> {
        self.variables
            .get(name)
            .ok_or_else(|| GridError::MissingVariable(name.to_string()))
    }

    /// Unpacked f32 values of a variable.
    pub fn values(&self, name: &str) -> Result<&[f32]> {
        self.variable(name)?.values.as_f32().ok_or_else(|| {
            GridError::invalid_query(format!(
                "variable '{}' is stored packed; decompress the dataset first",
                name
            ))
        })
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn is_float16(&self) -> bool {
        self.flag(ATTR_IS_FLOAT16)
    }

    pub fn is_tavg(&self) -> bool {
        self.flag(ATTR_IS_TAVG)
    }

    fn flag(&self, key: &str) -> bool {
        self.attrs.get(key).map(|v| v == "true").unwrap_or(false)
    }

    /// Estimated in-memory payload size in bytes.
    pub fn nbytes(&self) -> usize {
        let size_of = |values: &ArrayValues| match values {
            ArrayValues::Float32(v) => v.len() * 4,
            ArrayValues::Int16(v) => v.len() * 2,
        };
        size_of(&self.level)
            + size_of(&self.latitude)
            + size_of(&self.longitude)
            + self
                .variables
                .values()
                .map(|array| size_of(&array.values))
                .sum::<usize>()
    }
}
