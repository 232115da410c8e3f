//! Error types for geopoi.

use geopoi_types::GeometryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoPoiError>;

#[derive(Debug, Error)]
pub enum GeoPoiError {
    /// Invalid coordinate or polygon at construction time.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An identity present in a geo-index has no backing record.
    ///
    /// Signals seeding or index corruption; never skipped.
    #[error("record {key} is indexed but does not exist")]
    MissingRecord { key: String },

    #[error("operation cancelled")]
    Cancelled,

    /// A server-side script failed to compile or register. Fatal at startup.
    #[error("script '{name}' failed to compile: {reason}")]
    ScriptCompilation { name: String, reason: String },

    #[error("script {0} is not loaded")]
    UnknownScript(String),

    #[error("corrupt polygon vertex {key}[{field}]: {reason}")]
    CorruptVertex {
        key: String,
        field: String,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GeoPoiError {
    /// Faults that end a single query but leave the service usable.
    pub fn is_fatal_to_query(&self) -> bool {
        matches!(self, Self::MissingRecord { .. } | Self::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_scoped_faults() {
        assert!(GeoPoiError::Cancelled.is_fatal_to_query());
        assert!(
            GeoPoiError::MissingRecord {
                key: "POIs:France:1".into()
            }
            .is_fatal_to_query()
        );
        assert!(
            !GeoPoiError::ScriptCompilation {
                name: "x".into(),
                reason: "y".into()
            }
            .is_fatal_to_query()
        );
    }

    #[test]
    fn test_geometry_conversion() {
        let err: GeoPoiError = GeometryError::InvalidPolygon("too short".into()).into();
        assert!(matches!(err, GeoPoiError::Geometry(_)));
        assert_eq!(err.to_string(), "invalid polygon: too short");
    }
}
