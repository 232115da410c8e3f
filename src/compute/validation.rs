//! Validation of raw request values at the service boundary.

use crate::error::{GeoPoiError, Result};
use geopoi_types::{GeoLocation, Quadrilateral};

/// Builds a location from raw request values, naming the offending field.
///
/// # Examples
///
/// ```
/// use geopoi::compute::validation::location;
///
/// assert!(location("center", 48.85, 2.35).is_ok());
/// assert!(location("center", 95.0, 2.35).is_err());
/// ```
pub fn location(field: &str, lat: f64, lng: f64) -> Result<GeoLocation> {
    GeoLocation::new(lat, lng).map_err(|e| {
        log::debug!("Rejecting {} ({}, {}): {}", field, lat, lng, e);
        GeoPoiError::Geometry(e)
    })
}

/// A search radius must be a finite, non-negative number of meters.
pub fn validate_radius(meters: f64) -> Result<()> {
    if !meters.is_finite() {
        return Err(GeoPoiError::InvalidInput(format!(
            "Distance must be finite, got: {}",
            meters
        )));
    }

    if meters < 0.0 {
        return Err(GeoPoiError::InvalidInput(format!(
            "Distance must not be negative, got: {}",
            meters
        )));
    }

    Ok(())
}

/// Builds the query quadrilateral from NW, SW, SE, NE corner pairs.
pub fn quadrilateral(corners: [(f64, f64); 4]) -> Result<Quadrilateral> {
    let [nw, sw, se, ne] = corners;
    Ok(Quadrilateral::new(
        location("north-west corner", nw.0, nw.1)?,
        location("south-west corner", sw.0, sw.1)?,
        location("south-east corner", se.0, se.1)?,
        location("north-east corner", ne.0, ne.1)?,
    ))
}
