//! Cell and coordinate types for discrete global grids.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{check_latitude, check_longitude, GridResult};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a point, rejecting coordinates outside [-90, 90] x [-180, 180].
    pub fn checked(lat: f64, lon: f64) -> GridResult<Self> {
        Ok(Self {
            lat: check_latitude(lat)?,
            lon: check_longitude(lon)?,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// One discrete bin, addressed by row (south to north) and column (west to east).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

impl GridCell {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} col {}", self.row, self.col)
    }
}
