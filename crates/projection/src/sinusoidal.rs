//! Sinusoidal (Sanson-Flamsteed) equal-area projection on a sphere.
//!
//! forward: x = R·(λ - λ0)·cos(φ), y = R·φ
//! inverse: φ = y/R, λ = λ0 + x/(R·cos(φ))
//!
//! The ISIN grid is a discretization of this projection.

use std::f64::consts::{FRAC_PI_2, PI};

use grid_common::{check_latitude, check_longitude, GridError, GridResult};

use crate::transform::{wrap_radians, EqualAreaProjection, AUTHALIC_RADIUS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sinusoidal {
    /// Sphere radius (meters)
    pub radius: f64,
    /// Central meridian (degrees)
    pub central_meridian: f64,
}

impl Sinusoidal {
    pub fn new(radius: f64, central_meridian: f64) -> GridResult<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(GridError::invalid("radius", format!("{} must be positive", radius)));
        }
        check_longitude(central_meridian)?;
        Ok(Self {
            radius,
            central_meridian,
        })
    }

    /// Authalic sphere, Greenwich central meridian.
    pub fn spherical() -> Self {
        Self {
            radius: AUTHALIC_RADIUS,
            central_meridian: 0.0,
        }
    }
}

impl EqualAreaProjection for Sinusoidal {
    fn forward(&self, lat: f64, lon: f64) -> GridResult<(f64, f64)> {
        let phi = check_latitude(lat)?.to_radians();
        let dlon = wrap_radians((check_longitude(lon)? - self.central_meridian).to_radians());
        Ok((self.radius * dlon * phi.cos(), self.radius * phi))
    }

    fn inverse(&self, x: f64, y: f64) -> GridResult<(f64, f64)> {
        let phi = y / self.radius;
        if !(phi.abs() <= FRAC_PI_2 + 1e-12) || !x.is_finite() {
            return Err(GridError::ProjectionError(format!(
                "({}, {}) is outside the sinusoidal projection",
                x, y
            )));
        }
        let phi = phi.clamp(-FRAC_PI_2, FRAC_PI_2);
        let cos_phi = phi.cos();
        if cos_phi < 1e-15 {
            // Longitude is undefined at the poles
            return Ok((phi.to_degrees(), self.central_meridian));
        }

        let dlon = x / (self.radius * cos_phi);
        if dlon.abs() > PI + 1e-9 {
            return Err(GridError::ProjectionError(format!(
                "({}, {}) is outside the sinusoidal projection",
                x, y
            )));
        }
        let lon = wrap_radians(self.central_meridian.to_radians() + dlon).to_degrees();
        Ok((phi.to_degrees(), lon))
    }
}
