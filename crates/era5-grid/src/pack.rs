//! Half-precision packing of stored datasets.
//!
//! Packed datasets keep every data variable as the bit pattern of its f16
//! value reinterpreted as `i16`, pressure levels as whole `i16` hPa and
//! latitude/longitude as f32. The [`ATTR_IS_FLOAT16`] attribute marks the
//! packed representation.

use era5_common::{coordinate_dtype, CoordinateDtype};
use half::f16;
use rayon::prelude::*;
use tracing::debug;

use crate::dataset::{ArrayValues, Dataset, ATTR_IS_FLOAT16};

fn pack_values(values: &[f32]) -> Vec<i16> {
    values
        .par_iter()
        .map(|&v| f16::from_f32(v).to_bits() as i16)
        .collect()
}

fn unpack_values(values: &[i16]) -> Vec<f32> {
    values
        .par_iter()
        .map(|&v| f16::from_bits(v as u16).to_f32())
        .collect()
}

fn pack_coordinate(name: &str, values: &ArrayValues) -> ArrayValues {
    match (coordinate_dtype(name), values) {
        (CoordinateDtype::Int16, ArrayValues::Float32(v)) => {
            ArrayValues::Int16(v.iter().map(|&x| x.round() as i16).collect())
        }
        (CoordinateDtype::Float32, ArrayValues::Int16(v)) => {
            ArrayValues::Float32(v.iter().map(|&x| x as f32).collect())
        }
        _ => values.clone(),
    }
}

/// Pack a dataset for storage.
///
/// Already packed datasets are returned unchanged.
pub fn compress_dataset(dataset: &Dataset) -> Dataset {
    if dataset.is_float16() {
        return dataset.clone();
    }

    let mut packed = dataset.clone();
    packed.level = pack_coordinate("level", &dataset.level);
    packed.latitude = pack_coordinate("latitude", &dataset.latitude);
    packed.longitude = pack_coordinate("longitude", &dataset.longitude);

    for array in packed.variables.values_mut() {
        if let ArrayValues::Float32(values) = &array.values {
            array.values = ArrayValues::Int16(pack_values(values));
        }
    }
    packed
        .attrs
        .insert(ATTR_IS_FLOAT16.to_string(), "true".to_string());

    debug!(
        variables = packed.variables.len(),
        before = dataset.nbytes(),
        after = packed.nbytes(),
        "Packed dataset to float16"
    );
    packed
}

/// Inverse of [`compress_dataset`].
///
/// A dataset without the packed flag is returned as is.
pub fn decompress_dataset(dataset: Dataset) -> Dataset {
    if !dataset.is_float16() {
        return dataset;
    }

    let mut unpacked = dataset;
    unpacked.level = ArrayValues::Float32(unpacked.level.to_f32());
    for array in unpacked.variables.values_mut() {
        if let ArrayValues::Int16(values) = &array.values {
            array.values = ArrayValues::Float32(unpack_values(values));
        }
    }
    unpacked.attrs.remove(ATTR_IS_FLOAT16);
    unpacked
}
