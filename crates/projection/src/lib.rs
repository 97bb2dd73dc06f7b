//! Discrete global grids and equal-area world projections.
//!
//! Implements the grids and projections from scratch without external
//! projection libraries.

pub mod equirect;
pub mod isin;
pub mod mollweide;
pub mod registry;
pub mod sinusoidal;
pub mod transform;

pub use equirect::EquirectGrid;
pub use isin::{IsinGrid, RowInfo};
pub use mollweide::Mollweide;
pub use registry::{Grid, GridRegistry};
pub use sinusoidal::Sinusoidal;
pub use transform::{EqualAreaProjection, AUTHALIC_RADIUS};
