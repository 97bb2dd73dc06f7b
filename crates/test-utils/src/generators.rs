//! Deterministic coordinate generators.
//!
//! These generators create predictable, reproducible coordinate sets that
//! exercise grid edges as well as interiors.

use grid_common::GeoPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A regular lattice of points covering a bounding box, edges included.
///
/// # Arguments
///
/// * `bbox` - (min_lon, min_lat, max_lon, max_lat)
/// * `n_lat` - Number of latitudes (at least 2)
/// * `n_lon` - Number of longitudes (at least 2)
///
/// # Example
///
/// ```
/// use test_utils::lat_lon_sweep;
///
/// let points = lat_lon_sweep((-180.0, -90.0, 180.0, 90.0), 3, 3);
/// assert_eq!(points.len(), 9);
/// assert_eq!(points[0].lat, -90.0);
/// assert_eq!(points[8].lon, 180.0);
/// ```
pub fn lat_lon_sweep(bbox: (f64, f64, f64, f64), n_lat: usize, n_lon: usize) -> Vec<GeoPoint> {
    let (min_lon, min_lat, max_lon, max_lat) = bbox;
    let n_lat = n_lat.max(2);
    let n_lon = n_lon.max(2);

    let mut points = Vec::with_capacity(n_lat * n_lon);
    for i in 0..n_lat {
        let t = i as f64 / (n_lat - 1) as f64;
        // Pin the last sample exactly on the edge
        let lat = if i == n_lat - 1 { max_lat } else { min_lat + t * (max_lat - min_lat) };
        for j in 0..n_lon {
            let s = j as f64 / (n_lon - 1) as f64;
            let lon = if j == n_lon - 1 { max_lon } else { min_lon + s * (max_lon - min_lon) };
            points.push(GeoPoint::new(lat, lon));
        }
    }
    points
}

/// Pseudo-random points spread over the globe.
///
/// Seeded so runs are reproducible.
pub fn scattered_points(count: usize, seed: u64) -> Vec<GeoPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| GeoPoint::new(rng.gen_range(-90.0..90.0), rng.gen_range(-180.0..180.0)))
        .collect()
}

/// Latitudes a small distance either side of each row boundary of a grid with
/// `row_count` equal latitude steps and rows centred on multiples of the step.
pub fn near_row_boundaries(row_count: u32, offset: f64) -> Vec<f64> {
    let step = 180.0 / f64::from(row_count);
    let half_rows = row_count / 2;
    let mut lats = Vec::with_capacity(row_count as usize * 2);
    for v in 0..half_rows {
        let boundary = (f64::from(v) + 0.5) * step;
        for lat in [boundary - offset, boundary + offset] {
            lats.push(lat);
            lats.push(-lat);
        }
    }
    lats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_edges() {
        let points = lat_lon_sweep((-15.0, 35.0, 45.0, 72.0), 4, 5);
        assert_eq!(points.len(), 20);
        assert_eq!(points[0], GeoPoint::new(35.0, -15.0));
        assert_eq!(points[19], GeoPoint::new(72.0, 45.0));
    }

    #[test]
    fn test_scattered_points_reproducible_and_in_range() {
        let a = scattered_points(500, 42);
        let b = scattered_points(500, 42);
        assert_eq!(a, b);
        for p in &a {
            assert!((-90.0..90.0).contains(&p.lat));
            assert!((-180.0..180.0).contains(&p.lon));
        }
        assert_ne!(scattered_points(10, 1), scattered_points(10, 2));
    }

    #[test]
    fn test_near_row_boundaries() {
        let lats = near_row_boundaries(180, 1e-6);
        assert_eq!(lats.len(), 90 * 4);
        assert!((lats[0] - (0.5 - 1e-6)).abs() < 1e-12);
        assert!((lats[1] + (0.5 - 1e-6)).abs() < 1e-12);
    }
}
