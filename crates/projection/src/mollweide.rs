//! Mollweide equal-area projection on a sphere.
//!
//! The forward transform needs the auxiliary angle θ defined by
//! `2θ + sin 2θ = π sin φ`, which has no closed form and is solved by
//! Newton iteration. The inverse is closed-form:
//!
//! ```text
//! x = R · 2√2/π · (λ - λ0) · cos θ
//! y = R · √2 · sin θ
//! ```

use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

use grid_common::{check_latitude, check_longitude, GridError, GridResult};

use crate::transform::{wrap_radians, EqualAreaProjection, AUTHALIC_RADIUS};

/// Newton iteration stops once the correction falls below this (radians).
const NEWTON_TOLERANCE: f64 = 1e-12;
const NEWTON_MAX_ITERATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mollweide {
    /// Sphere radius (meters)
    pub radius: f64,
    /// Central meridian (degrees)
    pub central_meridian: f64,
}

impl Mollweide {
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

    /// Auxiliary angle θ for latitude `phi` (radians).
    pub fn auxiliary_angle(phi: f64) -> f64 {
        if (FRAC_PI_2 - phi.abs()).abs() < NEWTON_TOLERANCE {
            return phi.signum() * FRAC_PI_2;
        }

        // Solve t + sin t = π sin φ for t = 2θ, starting from t = φ
        let k = PI * phi.sin();
        let mut t = phi;
        for _ in 0..NEWTON_MAX_ITERATIONS {
            let step = (t + t.sin() - k) / (1.0 + t.cos());
            t -= step;
            if step.abs() < NEWTON_TOLERANCE {
                return t / 2.0;
            }
        }
        // Only reachable right next to the poles, where 1 + cos t vanishes
        phi.signum() * FRAC_PI_2
    }
}

impl EqualAreaProjection for Mollweide {
    fn forward(&self, lat: f64, lon: f64) -> GridResult<(f64, f64)> {
        let phi = check_latitude(lat)?.to_radians();
        let dlon = wrap_radians((check_longitude(lon)? - self.central_meridian).to_radians());
        let theta = Self::auxiliary_angle(phi);

        let x = self.radius * 2.0 * SQRT_2 / PI * dlon * theta.cos();
        let y = self.radius * SQRT_2 * theta.sin();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> GridResult<(f64, f64)> {
        let outside = || {
            GridError::ProjectionError(format!(
                "({}, {}) is outside the Mollweide ellipse",
                x, y
            ))
        };

        let sin_theta = y / (self.radius * SQRT_2);
        if !(sin_theta.abs() <= 1.0 + 1e-12) || !x.is_finite() {
            return Err(outside());
        }
        let theta = sin_theta.clamp(-1.0, 1.0).asin();
        let phi = ((2.0 * theta + (2.0 * theta).sin()) / PI).clamp(-1.0, 1.0).asin();

        let cos_theta = theta.cos();
        if cos_theta < 1e-15 {
            return Ok((phi.to_degrees(), self.central_meridian));
        }

        let dlon = PI * x / (2.0 * SQRT_2 * self.radius * cos_theta);
        if dlon.abs() > PI + 1e-9 {
            return Err(outside());
        }
        let lon = wrap_radians(self.central_meridian.to_radians() + dlon).to_degrees();
        Ok((phi.to_degrees(), lon))
    }
}
