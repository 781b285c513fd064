//! Common test fixtures for ERA5 tests.

/// Pressure levels in hPa.
pub mod levels {
    /// A short list for small fixtures.
    pub const SMALL: [u16; 3] = [1000, 850, 500];
}

/// Common grid specifications for testing.
pub mod grid {
    /// Coarse 30 degree grid for fast tests.
    pub const COARSE: GridSpec = GridSpec { nlat: 7, nlon: 12 };

    /// Global regular lat/lon grid, latitudes from 90 to -90, longitudes
    /// from 0 eastward.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GridSpec {
        pub nlat: usize,
        pub nlon: usize,
    }

    impl GridSpec {
        /// Returns the total number of grid cells per level.
        pub fn size(&self) -> usize {
            self.nlat * self.nlon
        }

        pub fn latitudes(&self) -> Vec<f32> {
            crate::generators::regular_latitudes(self.nlat)
        }

        pub fn longitudes(&self) -> Vec<f32> {
            crate::generators::regular_longitudes(self.nlon)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_spec_size() {
        assert_eq!(grid::COARSE.size(), 84);
    }

    #[test]
    fn test_coarse_coordinates() {
        assert_eq!(grid::COARSE.latitudes()[0], 90.0);
        assert_eq!(grid::COARSE.latitudes()[6], -90.0);
        assert_eq!(grid::COARSE.longitudes()[11], 330.0);
    }
}
