//! Grid catalog configuration.
//!
//! Loads named grid definitions from YAML:
//!
//! ```yaml
//! grids:
//!   - name: isin_2004
//!     type: isin
//!     row_count: 2004
//!     equator_row_width: 4010
//!   - name: global_1deg
//!     type: equirect
//!     row_count: 180
//!     col_count: 360
//!     min_lat: -90.0
//!     min_lon: -180.0
//!     lat_step: 1.0
//!     lon_step: 1.0
//! ```
//!
//! Supports environment variable substitution using ${VAR} and ${VAR:-default}.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{GridError, GridResult};

/// A set of named grid definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCatalog {
    pub grids: Vec<GridDefinition>,
}

/// One named grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: GridKind,
}

/// Geometry of a grid definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridKind {
    /// Sinusoidal equal-area grid with latitude-dependent row widths.
    Isin {
        row_count: u32,
        equator_row_width: u32,
    },
    /// Constant-step lat/lon grid.
    Equirect {
        row_count: u32,
        col_count: u32,
        min_lat: f64,
        min_lon: f64,
        lat_step: f64,
        lon_step: f64,
    },
}

impl GridKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            GridKind::Isin { .. } => "isin",
            GridKind::Equirect { .. } => "equirect",
        }
    }
}

impl GridCatalog {
    /// Grids available without a configuration file.
    pub fn builtin() -> Self {
        Self {
            grids: vec![
                GridDefinition {
                    name: "isin_2004".to_string(),
                    description: Some("ISIN grid, 2004 latitude steps".to_string()),
                    kind: GridKind::Isin {
                        row_count: 2004,
                        equator_row_width: 4010,
                    },
                },
                GridDefinition {
                    name: "isin_4320".to_string(),
                    description: Some("ISIN grid, 4320 latitude steps (~4.6 km bins)".to_string()),
                    kind: GridKind::Isin {
                        row_count: 4320,
                        equator_row_width: 8640,
                    },
                },
                GridDefinition {
                    name: "global_1deg".to_string(),
                    description: Some("Global 1 degree lat/lon grid".to_string()),
                    kind: GridKind::Equirect {
                        row_count: 180,
                        col_count: 360,
                        min_lat: -90.0,
                        min_lon: -180.0,
                        lat_step: 1.0,
                        lon_step: 1.0,
                    },
                },
            ],
        }
    }

    /// Load and validate a catalog file with environment variable substitution.
    pub fn from_file<P: AsRef<Path>>(path: P) -> GridResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            GridError::ConfigError(format!(
                "Failed to read grid catalog from {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let catalog = Self::from_yaml_str(&content)?;
        debug!(path = ?path.as_ref(), grids = catalog.grids.len(), "Loaded grid catalog");
        Ok(catalog)
    }

    /// Parse and validate a catalog from YAML text.
    pub fn from_yaml_str(content: &str) -> GridResult<Self> {
        let expanded = expand_env_vars(content)?;
        let catalog: GridCatalog = serde_yaml::from_str(&expanded)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Catalog-level checks. Geometry is validated when the grids are built.
    pub fn validate(&self) -> GridResult<()> {
        if self.grids.is_empty() {
            return Err(GridError::ConfigError(
                "Grid catalog defines no grids".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for def in &self.grids {
            if def.name.trim().is_empty() {
                warn!("Rejecting grid definition with empty name");
                return Err(GridError::ConfigError(
                    "Grid name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(def.name.as_str()) {
                warn!(name = %def.name, "Rejecting duplicate grid definition");
                return Err(GridError::ConfigError(format!(
                    "Duplicate grid name: {}",
                    def.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&GridDefinition> {
        self.grids.iter().find(|g| g.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.grids.iter().map(|g| g.name.as_str()).collect()
    }
}

/// Expand ${VAR} and ${VAR:-default} references. Comment lines are copied
/// through untouched.
fn expand_env_vars(content: &str) -> GridResult<String> {
    let mut result = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }

        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_expr = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => var_expr.push(c),
                        None => {
                            return Err(GridError::ConfigError(format!(
                                "Unclosed variable substitution: ${{{}",
                                var_expr.trim_end()
                            )))
                        }
                    }
                }

                result.push_str(&resolve_var_expr(&var_expr)?);
            } else {
                result.push(ch);
            }
        }
    }

    Ok(result)
}

/// Resolve `VAR` or `VAR:-default`. An empty variable counts as unset.
fn resolve_var_expr(expr: &str) -> GridResult<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).map_err(|_| {
            GridError::ConfigError(format!("Environment variable not set: {}", expr.trim()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = GridCatalog::builtin();
        catalog.validate().unwrap();
        assert_eq!(catalog.names(), vec!["isin_2004", "isin_4320", "global_1deg"]);
    }

    #[test]
    fn test_parse_tagged_definitions() {
        let yaml = r#"
grids:
  - name: small
    type: isin
    row_count: 18
    equator_row_width: 38
  - name: tenth
    description: "0.1 degree"
    type: equirect
    row_count: 1800
    col_count: 3600
    min_lat: -90.0
    min_lon: -180.0
    lat_step: 0.1
    lon_step: 0.1
"#;
        let catalog = GridCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.grids.len(), 2);
        assert_eq!(
            catalog.get("small").unwrap().kind,
            GridKind::Isin {
                row_count: 18,
                equator_row_width: 38
            }
        );
        assert_eq!(catalog.get("tenth").unwrap().kind.type_name(), "equirect");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = r#"
grids:
  - { name: a, type: isin, row_count: 4, equator_row_width: 10 }
  - { name: a, type: isin, row_count: 8, equator_row_width: 18 }
"#;
        let err = GridCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, GridError::ConfigError(_)));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let yaml = "grids:\n  - { name: a, type: healpix, nside: 4 }\n";
        let err = GridCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, GridError::Yaml(_)));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(GridCatalog::from_yaml_str("grids: []\n").is_err());
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("GRID_CATALOG_UNSET_ROWS");
        let result = expand_env_vars("row_count: ${GRID_CATALOG_UNSET_ROWS:-2004}").unwrap();
        assert_eq!(result, "row_count: 2004");
    }

    #[test]
    fn test_expand_env_vars_override() {
        std::env::set_var("GRID_CATALOG_ROWS", "4320");
        let result = expand_env_vars("row_count: ${GRID_CATALOG_ROWS:-2004}").unwrap();
        assert_eq!(result, "row_count: 4320");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("GRID_CATALOG_REQUIRED");
        assert!(expand_env_vars("${GRID_CATALOG_REQUIRED}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
    }

    #[test]
    fn test_expand_env_vars_skips_comments() {
        std::env::remove_var("GRID_CATALOG_COMMENTED");
        let yaml = "# Override with ${GRID_CATALOG_COMMENTED} or ${VAR:-default}\n  # ${GRID_CATALOG_COMMENTED}\nrow_count: 18\n";
        let result = expand_env_vars(yaml).unwrap();
        assert_eq!(result, yaml);
    }

    #[test]
    fn test_commented_reference_does_not_block_loading() {
        let yaml = "# Substitute with ${VAR}\ngrids:\n  - { name: a, type: isin, row_count: 4, equator_row_width: 10 }\n";
        let catalog = GridCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.names(), vec!["a"]);
    }

    #[test]
    fn test_empty_var_uses_default() {
        std::env::set_var("GRID_CATALOG_EMPTY_ROWS", "");
        let result = expand_env_vars("row_count: ${ GRID_CATALOG_EMPTY_ROWS :-2004}").unwrap();
        assert_eq!(result, "row_count: 2004");
    }

    #[test]
    fn test_var_name_is_trimmed() {
        std::env::set_var("GRID_CATALOG_TRIMMED", "38");
        let result = expand_env_vars("equator_row_width: ${ GRID_CATALOG_TRIMMED }").unwrap();
        assert_eq!(result, "equator_row_width: 38");
    }
}
