//! Shared pieces for the equal-area world projections.

use grid_common::GridResult;

/// Radius of the authalic sphere used by MODIS-style sinusoidal grids (meters).
pub const AUTHALIC_RADIUS: f64 = 6_371_007.181;

/// A projection between geographic degrees and planar meters.
///
/// Implementations are immutable and can be shared across threads.
pub trait EqualAreaProjection: Send + Sync {
    /// Geographic (lat, lon) in degrees to projected (x, y) in meters.
    fn forward(&self, lat: f64, lon: f64) -> GridResult<(f64, f64)>;

    /// Projected (x, y) in meters to geographic (lat, lon) in degrees.
    fn inverse(&self, x: f64, y: f64) -> GridResult<(f64, f64)>;

    /// Forward-transform a batch in place, stopping at the first failure.
    fn forward_batch(&self, coords: &mut [(f64, f64)]) -> GridResult<()> {
        for c in coords.iter_mut() {
            *c = self.forward(c.0, c.1)?;
        }
        Ok(())
    }
}

/// Wrap a longitude difference in radians into [-π, π].
pub(crate) fn wrap_radians(mut dlon: f64) -> f64 {
    use std::f64::consts::PI;
    while dlon > PI {
        dlon -= 2.0 * PI;
    }
    while dlon < -PI {
        dlon += 2.0 * PI;
    }
    dlon
}
