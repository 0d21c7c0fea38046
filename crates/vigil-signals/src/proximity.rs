//! Nearest hotspot lookup for a point.

use vigil_core::{GeoPoint, HotspotCell, StoredHotspotCell};

/// Anything positioned at a grid cell corner.
pub trait GridLocated {
    fn grid_point(&self) -> GeoPoint;
}

impl GridLocated for HotspotCell {
    fn grid_point(&self) -> GeoPoint {
        GeoPoint::new(self.grid_lat, self.grid_lon)
    }
}

impl GridLocated for StoredHotspotCell {
    fn grid_point(&self) -> GeoPoint {
        self.cell.grid_point()
    }
}

/// Squared planar distance in degrees. No great-circle correction, which is
/// fine at the sub-kilometer scale cells are compared at.
fn distance_sq(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = a.lat - b.lat;
    let dlon = a.lon - b.lon;
    dlat * dlat + dlon * dlon
}

/// The cell closest to `point`, or `None` when the point is undefined or
/// there are no cells. Ties go to the cell seen first.
pub fn nearest<T: GridLocated>(point: Option<GeoPoint>, cells: &[T]) -> Option<&T> {
    let point = point?;
    let mut best: Option<(&T, f64)> = None;
    for cell in cells {
        let d = distance_sq(point, cell.grid_point());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((cell, d)),
        }
    }
    best.map(|(cell, _)| cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(grid_lat: f64, grid_lon: f64, risk_score: i64) -> HotspotCell {
        HotspotCell {
            grid_lat,
            grid_lon,
            recent_count: 1,
            baseline_count: 0,
            risk_score,
        }
    }

    #[test]
    fn test_undefined_point_or_no_cells() {
        let cells = vec![cell(32.70, -117.16, 2)];
        assert!(nearest(None, &cells).is_none());
        assert!(nearest::<HotspotCell>(Some(GeoPoint::new(32.7, -117.1)), &[]).is_none());
    }

    #[test]
    fn test_picks_closest_cell() {
        let cells = vec![
            cell(32.780, -117.120, 9),
            cell(32.715, -117.160, 1),
            cell(32.740, -117.085, 5),
        ];
        let found = nearest(Some(GeoPoint::new(32.716, -117.158)), &cells).unwrap();
        assert_eq!(found.risk_score, 1);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let cells = vec![cell(32.5, -117.0, 1), cell(33.5, -117.0, 2)];
        let found = nearest(Some(GeoPoint::new(33.0, -117.0)), &cells).unwrap();
        assert_eq!(found.risk_score, 1);
    }

    #[test]
    fn test_point_inside_cell() {
        let cells = vec![cell(32.70, -117.165, 3), cell(32.705, -117.165, 4)];
        let found = nearest(Some(GeoPoint::new(32.7001, -117.1649)), &cells).unwrap();
        assert_eq!(found.risk_score, 3);
    }
}
