//! Error types shared by the grid crates.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Primary error type for grid and projection operations.
#[derive(Debug, Error)]
pub enum GridError {
    // === Caller contract violations ===
    #[error("Invalid argument '{param}': {message}")]
    InvalidArgument { param: String, message: String },

    // === Numeric errors ===
    #[error("Projection error: {0}")]
    ProjectionError(String),

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid YAML: {0}")]
    Yaml(String),
}

impl GridError {
    /// Shorthand for building an `InvalidArgument` error.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        GridError::InvalidArgument {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn kind_code(&self) -> &'static str {
        match self {
            GridError::InvalidArgument { .. } => "InvalidArgument",
            GridError::ProjectionError(_) => "ProjectionError",
            GridError::ConfigError(_)
            | GridError::Io(_)
            | GridError::Yaml(_) => "ConfigError",
        }
    }

    /// True for errors caused by the caller passing bad numbers.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, GridError::InvalidArgument { .. })
    }
}

// Conversion from common error types
impl From<std::io::Error> for GridError {
    fn from(err: std::io::Error) -> Self {
        GridError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for GridError {
    fn from(err: serde_yaml::Error) -> Self {
        GridError::Yaml(err.to_string())
    }
}

/// Reject a latitude outside [-90, 90] (or NaN).
pub fn check_latitude(lat: f64) -> GridResult<f64> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(GridError::invalid(
            "lat",
            format!("{} is outside [-90, 90]", lat),
        ));
    }
    Ok(lat)
}

/// Reject a longitude outside [-180, 180] (or NaN).
pub fn check_longitude(lon: f64) -> GridResult<f64> {
    if !(-180.0..=180.0).contains(&lon) {
        return Err(GridError::invalid(
            "lon",
            format!("{} is outside [-180, 180]", lon),
        ));
    }
    Ok(lon)
}
