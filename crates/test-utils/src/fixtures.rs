//! Common test fixtures for grid tests.

/// Reference values for the ISIN grid with 2004 latitude steps.
pub mod isin_2004 {
    /// Latitude steps from pole to pole.
    pub const ROW_COUNT: u32 = 2004;

    /// Bins in the equator row.
    pub const EQUATOR_ROW_WIDTH: u32 = 4010;

    /// (rows north of the equator, bins in that row)
    pub const ROW_WIDTHS: [(u32, u32); 5] = [
        (1002, 2),
        (1001, 8),
        (1000, 14),
        (300, 3574),
        (0, 4010),
    ];

    /// Latitude at the centre of the row `index` steps north of the equator.
    pub fn lat_of_index(index: u32) -> f64 {
        f64::from(index) * 180.0 / f64::from(ROW_COUNT)
    }
}

/// Common bounding box definitions for testing.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Europe bounding box
    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 35.0, 45.0, 72.0);

    /// Arctic cap above 80N
    pub const ARCTIC: (f64, f64, f64, f64) = (-180.0, 80.0, 180.0, 90.0);

    /// Southern ocean band
    pub const SOUTHERN_OCEAN: (f64, f64, f64, f64) = (-180.0, -70.0, 180.0, -45.0);
}

/// Named sample points as (lat, lon).
pub mod points {
    pub const LONDON: (f64, f64) = (51.5074, -0.1278);
    pub const SYDNEY: (f64, f64) = (-33.8688, 151.2093);
    pub const QUITO: (f64, f64) = (-0.1807, -78.4678);
    pub const MCMURDO: (f64, f64) = (-77.8419, 166.6863);
    pub const DATELINE_NORTH: (f64, f64) = (45.0, 180.0);
    pub const DATELINE_SOUTH: (f64, f64) = (-45.0, -180.0);
    pub const NORTH_POLE: (f64, f64) = (90.0, 0.0);
    pub const SOUTH_POLE: (f64, f64) = (-90.0, 0.0);

    /// All named points.
    pub const ALL: [(f64, f64); 8] = [
        LONDON,
        SYDNEY,
        QUITO,
        MCMURDO,
        DATELINE_NORTH,
        DATELINE_SOUTH,
        NORTH_POLE,
        SOUTH_POLE,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_of_index() {
        assert_eq!(isin_2004::lat_of_index(0), 0.0);
        assert_eq!(isin_2004::lat_of_index(1002), 90.0);
    }

    #[test]
    fn test_points_in_domain() {
        for (lat, lon) in points::ALL {
            assert!((-90.0..=90.0).contains(&lat));
            assert!((-180.0..=180.0).contains(&lon));
        }
    }
}
