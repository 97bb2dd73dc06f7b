//! Common types and utilities shared across the grid crates.

pub mod bbox;
pub mod config;
pub mod error;
pub mod grid;

pub use bbox::BoundingBox;
pub use config::{GridCatalog, GridDefinition, GridKind};
pub use error::{check_latitude, check_longitude, GridError, GridResult};
pub use grid::{GeoPoint, GridCell};
