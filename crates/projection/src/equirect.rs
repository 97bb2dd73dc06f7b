//! Equirectangular (plate carrée) lat/lon grid with constant step sizes.

use grid_common::{check_latitude, check_longitude, BoundingBox, GeoPoint, GridCell, GridError, GridResult};

/// Float slack allowed when checking that the grid stays inside the globe.
const EXTENT_TOLERANCE: f64 = 1e-9;

/// A regular lat/lon grid. Row 0 is the southernmost row and column 0 the
/// westernmost column.
#[derive(Debug, Clone, PartialEq)]
pub struct EquirectGrid {
    pub row_count: u32,
    pub col_count: u32,
    pub min_lat: f64,
    pub min_lon: f64,
    pub lat_step: f64,
    pub lon_step: f64,
}

impl EquirectGrid {
    /// Create a grid, validating that it lies within [-90, 90] x [-180, 180].
    pub fn new(
        row_count: u32,
        col_count: u32,
        min_lat: f64,
        min_lon: f64,
        lat_step: f64,
        lon_step: f64,
    ) -> GridResult<Self> {
        if row_count == 0 {
            return Err(GridError::invalid("row_count", "must be positive"));
        }
        if col_count == 0 {
            return Err(GridError::invalid("col_count", "must be positive"));
        }
        if !(lat_step > 0.0 && lat_step.is_finite()) {
            return Err(GridError::invalid(
                "lat_step",
                format!("{} must be positive", lat_step),
            ));
        }
        if !(lon_step > 0.0 && lon_step.is_finite()) {
            return Err(GridError::invalid(
                "lon_step",
                format!("{} must be positive", lon_step),
            ));
        }
        check_latitude(min_lat).map_err(|_| {
            GridError::invalid("min_lat", format!("{} is outside [-90, 90]", min_lat))
        })?;
        check_longitude(min_lon).map_err(|_| {
            GridError::invalid("min_lon", format!("{} is outside [-180, 180]", min_lon))
        })?;

        let max_lat = min_lat + f64::from(row_count) * lat_step;
        if max_lat > 90.0 + EXTENT_TOLERANCE {
            return Err(GridError::invalid(
                "row_count",
                format!("grid reaches latitude {} beyond 90", max_lat),
            ));
        }
        let max_lon = min_lon + f64::from(col_count) * lon_step;
        if max_lon > 180.0 + EXTENT_TOLERANCE {
            return Err(GridError::invalid(
                "col_count",
                format!("grid reaches longitude {} beyond 180", max_lon),
            ));
        }

        Ok(Self {
            row_count,
            col_count,
            min_lat,
            min_lon,
            lat_step,
            lon_step,
        })
    }

    /// Whole-globe grid with square cells of `cell_size` degrees.
    pub fn global(cell_size: f64) -> GridResult<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(GridError::invalid(
                "cell_size",
                format!("{} must be positive", cell_size),
            ));
        }
        let rows = (180.0 / cell_size).round();
        let cols = (360.0 / cell_size).round();
        if rows < 1.0 || rows > f64::from(u32::MAX) {
            return Err(GridError::invalid(
                "cell_size",
                format!("{} does not divide the globe into rows", cell_size),
            ));
        }
        Self::new(rows as u32, cols as u32, -90.0, -180.0, cell_size, cell_size)
    }

    pub fn max_lat(&self) -> f64 {
        self.min_lat + f64::from(self.row_count) * self.lat_step
    }

    pub fn max_lon(&self) -> f64 {
        self.min_lon + f64::from(self.col_count) * self.lon_step
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.min_lon, self.min_lat, self.max_lon(), self.max_lat())
    }

    /// Latitude of the centre of `row`.
    pub fn get_lat(&self, row: u32) -> GridResult<f64> {
        if row >= self.row_count {
            return Err(GridError::invalid(
                "row",
                format!("{} is outside [0, {})", row, self.row_count),
            ));
        }
        Ok((f64::from(row) + 0.5) * self.lat_step + self.min_lat)
    }

    /// Longitude of the centre of `col`.
    pub fn get_lon(&self, col: u32) -> GridResult<f64> {
        if col >= self.col_count {
            return Err(GridError::invalid(
                "col",
                format!("{} is outside [0, {})", col, self.col_count),
            ));
        }
        Ok((f64::from(col) + 0.5) * self.lon_step + self.min_lon)
    }

    /// Row containing `lat`. The northern edge belongs to the last row.
    pub fn lat_to_row(&self, lat: f64) -> GridResult<u32> {
        check_latitude(lat)?;
        Self::bin(lat, self.min_lat, self.lat_step, self.row_count)
            .ok_or_else(|| GridError::invalid("lat", format!("{} is outside the grid", lat)))
    }

    /// Column containing `lon`. The eastern edge belongs to the last column.
    pub fn lon_to_col(&self, lon: f64) -> GridResult<u32> {
        check_longitude(lon)?;
        Self::bin(lon, self.min_lon, self.lon_step, self.col_count)
            .ok_or_else(|| GridError::invalid("lon", format!("{} is outside the grid", lon)))
    }

    fn bin(value: f64, min: f64, step: f64, count: u32) -> Option<u32> {
        let index = ((value - min) / step).floor();
        if index < 0.0 {
            return None;
        }
        let max = f64::from(count);
        if index < max {
            Some(index as u32)
        } else if value <= min + max * step + EXTENT_TOLERANCE {
            Some(count - 1)
        } else {
            None
        }
    }

    pub fn lat_lon_to_grid_cell(&self, lat: f64, lon: f64) -> GridResult<GridCell> {
        Ok(GridCell::new(self.lat_to_row(lat)?, self.lon_to_col(lon)?))
    }

    pub fn grid_cell_to_lat_lon(&self, cell: GridCell) -> GridResult<GeoPoint> {
        Ok(GeoPoint::new(self.get_lat(cell.row)?, self.get_lon(cell.col)?))
    }

    pub fn cell_bounds(&self, cell: GridCell) -> GridResult<BoundingBox> {
        let center = self.grid_cell_to_lat_lon(cell)?;
        let half_lat = self.lat_step / 2.0;
        let half_lon = self.lon_step / 2.0;
        Ok(BoundingBox::new(
            center.lon - half_lon,
            center.lat - half_lat,
            center.lon + half_lon,
            center.lat + half_lat,
        ))
    }
}
