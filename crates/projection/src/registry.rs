//! Named grids built from a [`GridCatalog`].

use std::collections::BTreeMap;

use grid_common::{
    BoundingBox, GeoPoint, GridCatalog, GridCell, GridDefinition, GridError, GridKind, GridResult,
};
use tracing::{info, warn};

use crate::equirect::EquirectGrid;
use crate::isin::IsinGrid;

/// Any grid the catalog can describe.
#[derive(Debug, Clone)]
pub enum Grid {
    Isin(IsinGrid),
    Equirect(EquirectGrid),
}

impl Grid {
    /// Build the grid a definition describes, validating its geometry.
    pub fn from_definition(def: &GridDefinition) -> GridResult<Self> {
        match def.kind {
            GridKind::Isin {
                row_count,
                equator_row_width,
            } => Ok(Grid::Isin(IsinGrid::new(row_count, equator_row_width)?)),
            GridKind::Equirect {
                row_count,
                col_count,
                min_lat,
                min_lon,
                lat_step,
                lon_step,
            } => Ok(Grid::Equirect(EquirectGrid::new(
                row_count, col_count, min_lat, min_lon, lat_step, lon_step,
            )?)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Grid::Isin(_) => "isin",
            Grid::Equirect(_) => "equirect",
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        match self {
            Grid::Isin(g) => g.rows(),
            Grid::Equirect(g) => g.row_count,
        }
    }

    /// Number of cells.
    pub fn total_cells(&self) -> u64 {
        match self {
            Grid::Isin(g) => g.total_bins(),
            Grid::Equirect(g) => u64::from(g.row_count) * u64::from(g.col_count),
        }
    }

    pub fn lat_lon_to_grid_cell(&self, lat: f64, lon: f64) -> GridResult<GridCell> {
        match self {
            Grid::Isin(g) => g.lat_lon_to_grid_cell(lat, lon),
            Grid::Equirect(g) => g.lat_lon_to_grid_cell(lat, lon),
        }
    }

    pub fn grid_cell_to_lat_lon(&self, cell: GridCell) -> GridResult<GeoPoint> {
        match self {
            Grid::Isin(g) => g.grid_cell_to_lat_lon(cell),
            Grid::Equirect(g) => g.grid_cell_to_lat_lon(cell),
        }
    }

    pub fn cell_bounds(&self, cell: GridCell) -> GridResult<BoundingBox> {
        match self {
            Grid::Isin(g) => g.cell_bounds(cell),
            Grid::Equirect(g) => g.cell_bounds(cell),
        }
    }

    /// Row-major cell id. ISIN grids use their bin numbering.
    pub fn cell_id(&self, cell: GridCell) -> GridResult<u64> {
        match self {
            Grid::Isin(g) => g.bin_index(cell),
            Grid::Equirect(g) => {
                g.grid_cell_to_lat_lon(cell)?;
                Ok(u64::from(cell.row) * u64::from(g.col_count) + u64::from(cell.col))
            }
        }
    }

    /// Cell for a row-major cell id.
    pub fn cell_for_id(&self, id: u64) -> GridResult<GridCell> {
        match self {
            Grid::Isin(g) => g.cell_for_bin(id),
            Grid::Equirect(g) => {
                if id >= self.total_cells() {
                    return Err(GridError::invalid(
                        "id",
                        format!("{} is outside [0, {})", id, self.total_cells()),
                    ));
                }
                let cols = u64::from(g.col_count);
                Ok(GridCell::new((id / cols) as u32, (id % cols) as u32))
            }
        }
    }
}

/// Grids keyed by catalog name.
#[derive(Debug, Clone, Default)]
pub struct GridRegistry {
    grids: BTreeMap<String, Grid>,
}

impl GridRegistry {
    /// Build every grid in the catalog. Fails on the first invalid definition.
    pub fn from_catalog(catalog: &GridCatalog) -> GridResult<Self> {
        catalog.validate()?;

        let mut grids = BTreeMap::new();
        for def in &catalog.grids {
            let grid = Grid::from_definition(def).map_err(|e| {
                warn!(name = %def.name, error = %e, "Invalid grid definition");
                GridError::ConfigError(format!("grid '{}': {}", def.name, e))
            })?;
            grids.insert(def.name.clone(), grid);
        }

        info!(grids = grids.len(), "Grid registry ready");
        Ok(Self { grids })
    }

    /// Registry of the built-in grids.
    pub fn builtin() -> GridResult<Self> {
        Self::from_catalog(&GridCatalog::builtin())
    }

    pub fn get(&self, name: &str) -> GridResult<&Grid> {
        self.grids.get(name).ok_or_else(|| {
            GridError::invalid(
                "grid",
                format!(
                    "unknown grid '{}' (available: {})",
                    name,
                    self.names().join(", ")
                ),
            )
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.grids.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Grid)> {
        self.grids.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = GridRegistry::builtin().unwrap();
        assert_eq!(registry.names(), vec!["global_1deg", "isin_2004", "isin_4320"]);
        assert_eq!(registry.get("isin_2004").unwrap().type_name(), "isin");
        assert!(registry.get("nope").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_shipped_catalog_builds() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/grids.yaml");
        let catalog = GridCatalog::from_file(path).unwrap();
        let registry = GridRegistry::from_catalog(&catalog).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("global_0p25").unwrap().total_cells(), 720 * 1440);
        assert_eq!(registry.get("europe_0p5").unwrap().type_name(), "equirect");
    }

    #[test]
    fn test_invalid_geometry_is_config_error() {
        let catalog = GridCatalog::from_yaml_str(
            "grids:\n  - { name: odd, type: isin, row_count: 2003, equator_row_width: 4010 }\n",
        )
        .unwrap();
        let err = GridRegistry::from_catalog(&catalog).unwrap_err();
        assert!(matches!(err, GridError::ConfigError(ref m) if m.contains("odd")));
    }

    #[test]
    fn test_equirect_cell_ids() {
        let registry = GridRegistry::builtin().unwrap();
        let grid = registry.get("global_1deg").unwrap();
        assert_eq!(grid.total_cells(), 64_800);

        let cell = grid.lat_lon_to_grid_cell(0.0, 0.0).unwrap();
        let id = grid.cell_id(cell).unwrap();
        assert_eq!(id, 90 * 360 + 180);
        assert_eq!(grid.cell_for_id(id).unwrap(), cell);
        assert!(grid.cell_for_id(64_800).is_err());
        assert!(grid.cell_id(GridCell::new(180, 0)).is_err());
    }

    #[test]
    fn test_isin_dispatch_matches_direct() {
        let registry = GridRegistry::builtin().unwrap();
        let grid = registry.get("isin_2004").unwrap();
        let direct = IsinGrid::isin_2004();

        let cell = grid.lat_lon_to_grid_cell(51.5, -0.12).unwrap();
        assert_eq!(cell, direct.lat_lon_to_grid_cell(51.5, -0.12).unwrap());
        assert_eq!(grid.cell_id(cell).unwrap(), direct.bin_index(cell).unwrap());
        assert_eq!(grid.rows(), 2005);
    }
}
