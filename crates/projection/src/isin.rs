//! Integerized sinusoidal (ISIN) equal-area grid.
//!
//! The globe is cut into rows of equal height. Each row holds a
//! latitude-dependent number of equal-width bins, so that every bin covers
//! roughly the same area. Bins are numbered from the south pole row
//! eastward from -180°, one row after another.
//!
//! Rows are centred on multiples of the row height. This gives one row on the
//! equator and two half-height cap rows at the poles, so a grid with
//! `row_count` latitude steps has `row_count + 1` rows.
//!
//! Per row, with `v` the signed distance from the equator in rows:
//!
//! ```text
//! h_eq = (N_eq - 2) / 2
//! N_v  = 2 * floor(h_eq * cos(|v| * cell_size_y) + 0.5) + 2
//! ```
//!
//! Every row therefore holds an even number of bins and the two hemispheres
//! mirror each other exactly.

use grid_common::{
    check_latitude, check_longitude, BoundingBox, GeoPoint, GridCell, GridError, GridResult,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// An ISIN grid with precomputed row tables.
#[derive(Debug, Clone)]
pub struct IsinGrid {
    /// Latitude steps from pole to pole
    row_count: u32,
    /// Bins in the equator row
    equator_row_width: u32,
    /// Row height in degrees
    cell_size_y: f64,
    /// Bins per row, south pole first (`row_count + 1` entries)
    columns: Vec<u32>,
    /// Bin id of the first cell of each row; the final entry is the total
    offsets: Vec<u64>,
}

/// Summary of one grid row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowInfo {
    pub row: u32,
    /// Signed row distance from the equator
    pub lat_index: i64,
    pub center_lat: f64,
    pub columns: u32,
    pub bin_offset: u64,
}

impl IsinGrid {
    /// Create a grid with `row_count` latitude steps and `equator_row_width`
    /// bins on the equator.
    ///
    /// Both values must be even. `row_count` must be at least 2 and
    /// `equator_row_width` at least 4.
    pub fn new(row_count: u32, equator_row_width: u32) -> GridResult<Self> {
        if row_count < 2 || row_count % 2 != 0 {
            return Err(GridError::invalid(
                "row_count",
                format!("{} must be an even number >= 2", row_count),
            ));
        }
        if equator_row_width < 4 || equator_row_width % 2 != 0 {
            return Err(GridError::invalid(
                "equator_row_width",
                format!("{} must be an even number >= 4", equator_row_width),
            ));
        }
        Ok(Self::build(row_count, equator_row_width))
    }

    /// 2004 latitude steps, 4010 bins on the equator.
    pub fn isin_2004() -> Self {
        Self::build(2004, 4010)
    }

    /// 4320 latitude steps, 8640 bins on the equator (about 23.8 million bins).
    pub fn isin_4320() -> Self {
        Self::build(4320, 8640)
    }

    fn build(row_count: u32, equator_row_width: u32) -> Self {
        let cell_size_y = 180.0 / f64::from(row_count);
        let half_rows = row_count / 2;
        let half_width = f64::from((equator_row_width - 2) / 2);

        let columns: Vec<u32> = (0..=row_count)
            .map(|row| {
                let lat = f64::from(row.abs_diff(half_rows)) * cell_size_y;
                let half = (half_width * lat.to_radians().cos() + 0.5).floor();
                2 * half as u32 + 2
            })
            .collect();

        let mut offsets = Vec::with_capacity(columns.len() + 1);
        let mut total = 0u64;
        offsets.push(total);
        for &n in &columns {
            total += u64::from(n);
            offsets.push(total);
        }

        debug!(
            row_count,
            equator_row_width,
            rows = columns.len(),
            total_bins = total,
            "Built ISIN grid"
        );

        Self {
            row_count,
            equator_row_width,
            cell_size_y,
            columns,
            offsets,
        }
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn equator_row_width(&self) -> u32 {
        self.equator_row_width
    }

    /// Row height in degrees.
    pub fn cell_size_y(&self) -> f64 {
        self.cell_size_y
    }

    /// Number of rows, including both polar caps.
    pub fn rows(&self) -> u32 {
        self.row_count + 1
    }

    /// Row index of the equator row.
    pub fn equator_row(&self) -> u32 {
        self.row_count / 2
    }

    /// Total number of bins in the grid.
    pub fn total_bins(&self) -> u64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// Row containing `lat`.
    ///
    /// A latitude exactly on a row boundary belongs to the poleward row in
    /// both hemispheres.
    pub fn lat_to_row(&self, lat: f64) -> GridResult<u32> {
        check_latitude(lat)?;
        Ok(self.row_for_valid_lat(lat))
    }

    fn row_for_valid_lat(&self, lat: f64) -> u32 {
        let half_rows = self.row_count / 2;
        // min() absorbs float noise right at the poles
        let steps = ((lat.abs() / self.cell_size_y + 0.5).floor() as u32).min(half_rows);
        if lat < 0.0 {
            half_rows - steps
        } else {
            half_rows + steps
        }
    }

    /// Number of bins in the row containing `lat` (`N_v`).
    pub fn compute_row_count(&self, lat: f64) -> GridResult<u32> {
        let row = self.lat_to_row(lat)?;
        Ok(self.columns[row as usize])
    }

    /// Bin id of the first bin in the row containing `lat` (`B_v`).
    ///
    /// This is the number of bins in all rows south of that row.
    pub fn compute_bin_offset(&self, lat: f64) -> GridResult<u64> {
        let row = self.lat_to_row(lat)?;
        Ok(self.offsets[row as usize])
    }

    /// Number of bins in `row`.
    pub fn row_column_count(&self, row: u32) -> GridResult<u32> {
        self.columns
            .get(row as usize)
            .copied()
            .ok_or_else(|| self.row_out_of_range(row))
    }

    /// Bin id of the first bin in `row`.
    pub fn row_bin_offset(&self, row: u32) -> GridResult<u64> {
        self.row_column_count(row)?;
        Ok(self.offsets[row as usize])
    }

    /// Latitude of the centre of `row`.
    pub fn row_center_lat(&self, row: u32) -> GridResult<f64> {
        self.row_column_count(row)?;
        Ok(self.center_lat(row))
    }

    fn center_lat(&self, row: u32) -> f64 {
        (f64::from(row) - f64::from(self.row_count / 2)) * self.cell_size_y
    }

    /// Summary of `row`.
    pub fn row_info(&self, row: u32) -> GridResult<RowInfo> {
        let columns = self.row_column_count(row)?;
        Ok(RowInfo {
            row,
            lat_index: i64::from(row) - i64::from(self.row_count / 2),
            center_lat: self.center_lat(row),
            columns,
            bin_offset: self.offsets[row as usize],
        })
    }

    /// Iterate over all rows from the south pole northward.
    pub fn row_infos(&self) -> impl Iterator<Item = RowInfo> + '_ {
        (0..self.rows()).map(move |row| RowInfo {
            row,
            lat_index: i64::from(row) - i64::from(self.row_count / 2),
            center_lat: self.center_lat(row),
            columns: self.columns[row as usize],
            bin_offset: self.offsets[row as usize],
        })
    }

    /// Cell containing the coordinate.
    pub fn lat_lon_to_grid_cell(&self, lat: f64, lon: f64) -> GridResult<GridCell> {
        check_latitude(lat)?;
        check_longitude(lon)?;

        let row = self.row_for_valid_lat(lat);
        let n = self.columns[row as usize];
        // lon == 180 lands one past the last column
        let col = (((lon + 180.0) / 360.0 * f64::from(n)).floor() as u32).min(n - 1);

        Ok(GridCell::new(row, col))
    }

    /// Map many coordinates in parallel. Results keep the input order.
    pub fn lat_lon_to_grid_cells(&self, points: &[GeoPoint]) -> Vec<GridResult<GridCell>> {
        points
            .par_iter()
            .map(|p| self.lat_lon_to_grid_cell(p.lat, p.lon))
            .collect()
    }

    /// Centre coordinate of `cell`.
    pub fn grid_cell_to_lat_lon(&self, cell: GridCell) -> GridResult<GeoPoint> {
        let n = self.checked_columns(cell)?;
        let lon = (f64::from(cell.col) + 0.5) * (360.0 / f64::from(n)) - 180.0;
        Ok(GeoPoint::new(self.center_lat(cell.row), lon))
    }

    /// Approximate coordinate range covered by `cell`.
    pub fn cell_bounds(&self, cell: GridCell) -> GridResult<BoundingBox> {
        let n = self.checked_columns(cell)?;
        let lat = self.center_lat(cell.row);
        let half = self.cell_size_y / 2.0;
        let width = 360.0 / f64::from(n);

        Ok(BoundingBox::new(
            f64::from(cell.col) * width - 180.0,
            (lat - half).max(-90.0),
            f64::from(cell.col + 1) * width - 180.0,
            (lat + half).min(90.0),
        ))
    }

    /// Global bin id of `cell`.
    pub fn bin_index(&self, cell: GridCell) -> GridResult<u64> {
        self.checked_columns(cell)?;
        Ok(self.offsets[cell.row as usize] + u64::from(cell.col))
    }

    /// Cell with global bin id `bin`.
    pub fn cell_for_bin(&self, bin: u64) -> GridResult<GridCell> {
        if bin >= self.total_bins() {
            return Err(GridError::invalid(
                "bin",
                format!("{} is outside [0, {})", bin, self.total_bins()),
            ));
        }
        // offsets[0] == 0 <= bin, so the partition point is at least 1
        let row = self.offsets.partition_point(|&offset| offset <= bin) - 1;
        let col = bin - self.offsets[row];
        Ok(GridCell::new(row as u32, col as u32))
    }

    /// Coordinate range covered by bin `bin`.
    pub fn bin_bounds(&self, bin: u64) -> GridResult<BoundingBox> {
        self.cell_bounds(self.cell_for_bin(bin)?)
    }

    fn checked_columns(&self, cell: GridCell) -> GridResult<u32> {
        let n = self.row_column_count(cell.row)?;
        if cell.col >= n {
            return Err(GridError::invalid(
                "col",
                format!("{} is outside [0, {}) for row {}", cell.col, n, cell.row),
            ));
        }
        Ok(n)
    }

    fn row_out_of_range(&self, row: u32) -> GridError {
        GridError::invalid(
            "row",
            format!("{} is outside [0, {}]", row, self.row_count),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Latitude of the row `index` steps north of the equator on the 2004-step grid.
    fn lat_2004(index: u32) -> f64 {
        f64::from(index) * 180.0 / 2004.0
    }

    #[test]
    fn test_reference_row_counts() {
        let grid = IsinGrid::isin_2004();
        assert_eq!(grid.compute_row_count(lat_2004(1002)).unwrap(), 2);
        assert_eq!(grid.compute_row_count(lat_2004(1001)).unwrap(), 8);
        assert_eq!(grid.compute_row_count(lat_2004(1000)).unwrap(), 14);
        assert_eq!(grid.compute_row_count(lat_2004(300)).unwrap(), 3574);
    }

    #[test]
    fn test_equator_row_count() {
        let grid = IsinGrid::isin_2004();
        assert_eq!(grid.compute_row_count(0.0).unwrap(), 4010);
        assert_eq!(grid.compute_row_count(0.0).unwrap(), grid.equator_row_width());

        let production = IsinGrid::isin_4320();
        assert_eq!(production.compute_row_count(0.0).unwrap(), 8640);
    }

    #[test]
    fn test_row_counts_mirror_and_shrink() {
        let grid = IsinGrid::isin_2004();
        let equator = grid.equator_row();
        let mut previous = grid.row_column_count(equator).unwrap();
        for step in 1..=equator {
            let north = grid.row_column_count(equator + step).unwrap();
            let south = grid.row_column_count(equator - step).unwrap();
            assert_eq!(north, south, "asymmetric row width {} rows from the equator", step);
            assert!(north <= previous, "row width grew at step {}", step);
            assert_eq!(north % 2, 0, "odd row width at step {}", step);
            previous = north;
        }
    }

    #[test]
    fn test_row_count_sign_symmetry() {
        let grid = IsinGrid::isin_2004();
        for lat in [0.01, 1.0, 12.345, 45.0, 66.6, 89.9, 90.0] {
            assert_eq!(
                grid.compute_row_count(lat).unwrap(),
                grid.compute_row_count(-lat).unwrap(),
                "lat {}",
                lat
            );
        }
    }

    #[test]
    fn test_pole_offset_law() {
        let grid = IsinGrid::isin_2004();
        let south = grid.compute_bin_offset(-90.0).unwrap();
        let equator = grid.compute_bin_offset(0.0).unwrap();
        let north = grid.compute_bin_offset(90.0).unwrap();

        assert_eq!(south, 0);
        assert_eq!(north, 2 * equator + u64::from(grid.equator_row_width()) - 2);
        assert_eq!(grid.total_bins(), north + 2);
    }

    #[test]
    fn test_mirror_offset_law_every_row() {
        let grid = IsinGrid::isin_2004();
        let equator = grid.row_bin_offset(grid.equator_row()).unwrap();
        let expected = 2 * equator + u64::from(grid.equator_row_width());
        for row in 0..grid.rows() {
            let mirror = grid.row_count() - row;
            let sum = grid.row_bin_offset(row).unwrap()
                + grid.row_bin_offset(mirror).unwrap()
                + u64::from(grid.row_column_count(row).unwrap());
            assert_eq!(sum, expected, "mirror law fails for row {}", row);
        }
    }

    #[test]
    fn test_row_boundary_goes_poleward() {
        // 1 degree rows keep the boundaries exact in binary
        let grid = IsinGrid::new(180, 362).unwrap();
        assert_eq!(grid.cell_size_y(), 1.0);
        assert_eq!(grid.lat_to_row(10.5).unwrap(), 90 + 11);
        assert_eq!(grid.lat_to_row(-10.5).unwrap(), 90 - 11);
        assert_eq!(grid.lat_to_row(10.4999).unwrap(), 90 + 10);
        assert_eq!(grid.lat_to_row(0.5).unwrap(), 91);
        assert_eq!(grid.lat_to_row(-0.5).unwrap(), 89);
        assert_eq!(grid.lat_to_row(89.5).unwrap(), 180);
        assert_eq!(grid.lat_to_row(-90.0).unwrap(), 0);
    }

    #[test]
    fn test_cell_lookup_and_center() {
        let grid = IsinGrid::isin_2004();
        let cell = grid.lat_lon_to_grid_cell(0.0, -180.0).unwrap();
        assert_eq!(cell, GridCell::new(1002, 0));

        let east_edge = grid.lat_lon_to_grid_cell(0.0, 180.0).unwrap();
        assert_eq!(east_edge, GridCell::new(1002, 4009));

        let center = grid.grid_cell_to_lat_lon(GridCell::new(1002, 0)).unwrap();
        assert_eq!(center.lat, 0.0);
        assert!((center.lon - (-180.0 + 180.0 / 4010.0)).abs() < 1e-12);
    }

    #[test]
    fn test_polar_cap_cells() {
        let grid = IsinGrid::isin_2004();
        let west = grid.lat_lon_to_grid_cell(90.0, -10.0).unwrap();
        let east = grid.lat_lon_to_grid_cell(90.0, 10.0).unwrap();
        assert_eq!(west, GridCell::new(2004, 0));
        assert_eq!(east, GridCell::new(2004, 1));

        let bounds = grid.cell_bounds(east).unwrap();
        assert_eq!(bounds.max_y, 90.0);
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 180.0);
    }

    #[test]
    fn test_bin_index_inverse() {
        let grid = IsinGrid::isin_2004();
        assert_eq!(grid.cell_for_bin(0).unwrap(), GridCell::new(0, 0));
        assert_eq!(grid.cell_for_bin(1).unwrap(), GridCell::new(0, 1));
        assert_eq!(grid.cell_for_bin(2).unwrap(), GridCell::new(1, 0));

        let last = grid.total_bins() - 1;
        assert_eq!(grid.cell_for_bin(last).unwrap(), GridCell::new(2004, 1));

        let cell = GridCell::new(700, 1234);
        let bin = grid.bin_index(cell).unwrap();
        assert_eq!(grid.cell_for_bin(bin).unwrap(), cell);
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let grid = IsinGrid::isin_2004();
        for (lat, lon) in [(90.5, 0.0), (-91.0, 0.0), (0.0, 180.01), (0.0, -200.0), (f64::NAN, 0.0)] {
            let err = grid.lat_lon_to_grid_cell(lat, lon).unwrap_err();
            assert!(err.is_invalid_argument(), "({}, {}) gave {}", lat, lon, err);
        }
        assert!(grid.compute_row_count(100.0).is_err());
        assert!(grid.compute_bin_offset(-100.0).is_err());
    }

    #[test]
    fn test_invalid_cells_rejected() {
        let grid = IsinGrid::isin_2004();
        assert!(grid.grid_cell_to_lat_lon(GridCell::new(2005, 0)).is_err());
        assert!(grid.grid_cell_to_lat_lon(GridCell::new(2004, 2)).is_err());
        assert!(grid.bin_index(GridCell::new(1002, 4010)).is_err());
        assert!(grid.cell_for_bin(grid.total_bins()).is_err());
        assert!(grid.row_info(3000).is_err());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(IsinGrid::new(0, 10).is_err());
        assert!(IsinGrid::new(2003, 4010).is_err());
        assert!(IsinGrid::new(2004, 4011).is_err());
        assert!(IsinGrid::new(2004, 2).is_err());

        let grid = IsinGrid::new(2004, 4010).unwrap();
        assert_eq!(grid.total_bins(), IsinGrid::isin_2004().total_bins());
    }

    #[test]
    fn test_row_infos_cover_all_bins() {
        let grid = IsinGrid::new(36, 74).unwrap();
        let rows: Vec<RowInfo> = grid.row_infos().collect();
        assert_eq!(rows.len(), 37);
        assert_eq!(rows[0].lat_index, -18);
        assert_eq!(rows[18].center_lat, 0.0);
        assert_eq!(rows[18].columns, 74);

        let last = rows[rows.len() - 1];
        assert_eq!(u64::from(last.columns) + last.bin_offset, grid.total_bins());
        assert_eq!(grid.row_info(5).unwrap(), rows[5]);
    }

    #[test]
    fn test_production_grid_size() {
        let grid = IsinGrid::isin_4320();
        assert_eq!(grid.rows(), 4321);
        let total = grid.total_bins();
        assert!(total > 23_700_000 && total < 23_800_000, "total bins {}", total);
    }
}
