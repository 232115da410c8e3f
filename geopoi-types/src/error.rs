use thiserror::Error;

/// Construction-time failures for geographic values.
///
/// These are raised at the input boundary and never recovered locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Latitude outside [-90, 90] or longitude outside [-180, 180] (NaN included).
    #[error("invalid coordinate (lat: {lat}, lng: {lng}): {reason}")]
    InvalidCoordinate { lat: f64, lng: f64, reason: String },

    /// Ring with fewer than three vertices or whose last vertex does not repeat the first.
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),
}
