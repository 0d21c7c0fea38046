//! Fixed-resolution lat/lon grid binning.
//!
//! Points are floor-binned: a cell is identified by the integer indices
//! `(floor(lat / size), floor(lon / size))` and its coordinates are the
//! lower-left corner `index * size`. Keys are exact integers, so two points in
//! the same cell always compare equal regardless of float noise in the corner.

use serde::{Deserialize, Serialize};
use vigil_core::defaults;

/// Absorbs float error so a cell's own corner bins back into that cell.
const INDEX_EPSILON: f64 = 1e-9;

/// Integer identity of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub lat_index: i64,
    pub lon_index: i64,
}

/// Maps points onto grid cells of a fixed size in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBinner {
    cell_size: f64,
}

impl Default for GridBinner {
    fn default() -> Self {
        Self::new(defaults::GRID_CELL_SIZE_DEG)
    }
}

impl GridBinner {
    /// `cell_size` must be positive and finite; `SignalConfig::validate`
    /// guarantees this for configured binners.
    pub fn new(cell_size: f64) -> Self {
        Self { cell_size }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn key(&self, lat: f64, lon: f64) -> CellKey {
        CellKey {
            lat_index: self.index(lat),
            lon_index: self.index(lon),
        }
    }

    /// Lower-left corner of a cell as `(grid_lat, grid_lon)`.
    pub fn origin(&self, key: CellKey) -> (f64, f64) {
        (
            key.lat_index as f64 * self.cell_size,
            key.lon_index as f64 * self.cell_size,
        )
    }

    pub fn bin(&self, lat: f64, lon: f64) -> (f64, f64) {
        self.origin(self.key(lat, lon))
    }

    fn index(&self, value: f64) -> i64 {
        (value / self.cell_size + INDEX_EPSILON).floor() as i64
    }
}

/// Bin one point with the given cell size.
pub fn bin(lat: f64, lon: f64, cell_size: f64) -> (f64, f64) {
    GridBinner::new(cell_size).bin(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_cell_same_key() {
        let grid = GridBinner::default();
        assert_eq!(grid.key(32.7011, -117.1601), grid.key(32.7049, -117.1649));
        assert_eq!(grid.key(32.7011, -117.1601), grid.key(32.7011, -117.1601));
    }

    #[test]
    fn test_boundary_crossing_changes_key() {
        let grid = GridBinner::default();
        let a = grid.key(32.7049, -117.16);
        let b = grid.key(32.7049 + 0.005, -117.16);
        assert_ne!(a, b);
        assert_eq!(b.lat_index, a.lat_index + 1);
    }

    #[test]
    fn test_floor_binning_negative_longitude() {
        let (grid_lat, grid_lon) = bin(32.7031, -117.1612, 0.005);
        assert!((grid_lat - 32.700).abs() < 1e-9);
        assert!((grid_lon - -117.165).abs() < 1e-9);
    }

    #[test]
    fn test_origin_bins_to_itself() {
        let grid = GridBinner::default();
        for (lat, lon) in [(32.70, -117.16), (32.7157, -117.1611), (-33.8688, 151.2093)] {
            let key = grid.key(lat, lon);
            let (grid_lat, grid_lon) = grid.origin(key);
            assert_eq!(grid.key(grid_lat, grid_lon), key);
        }
    }

    #[test]
    fn test_bin_is_deterministic() {
        assert_eq!(bin(32.74, -117.08, 0.005), bin(32.74, -117.08, 0.005));
    }

    #[test]
    fn test_custom_cell_size() {
        let grid = GridBinner::new(0.1);
        assert_eq!(grid.cell_size(), 0.1);
        assert_eq!(grid.key(32.71, -117.16), grid.key(32.79, -117.11));
    }
}
