use crate::error::GeometryError;
use serde::{Deserialize, Serialize};

/// A validated geographic location, latitude first.
///
/// Latitude lies in [-90, 90] and longitude in [-180, 180]. Non-finite
/// values fail the range checks and are rejected as well.
///
/// # Examples
///
/// ```
/// use geopoi_types::GeoLocation;
///
/// let paris = GeoLocation::new(48.8566, 2.3522).unwrap();
/// assert_eq!(paris.lat(), 48.8566);
/// assert_eq!(paris.lng(), 2.3522);
///
/// assert!(GeoLocation::new(91.0, 0.0).is_err());
/// assert!(GeoLocation::new(0.0, 181.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation", into = "RawLocation")]
pub struct GeoLocation {
    lat: f64,
    lng: f64,
}

/// Unchecked wire form; every deserialized location goes through [`GeoLocation::new`].
#[derive(Serialize, Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

impl GeoLocation {
    pub const MIN_LAT: f64 = -90.0;
    pub const MAX_LAT: f64 = 90.0;
    pub const MIN_LNG: f64 = -180.0;
    pub const MAX_LNG: f64 = 180.0;

    /// Build a location from latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidCoordinate`] if either value is out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeometryError> {
        if !Self::is_valid_latitude(lat) {
            return Err(GeometryError::InvalidCoordinate {
                lat,
                lng,
                reason: "latitude must be between -90 and 90 degrees".into(),
            });
        }

        if !Self::is_valid_longitude(lng) {
            return Err(GeometryError::InvalidCoordinate {
                lat,
                lng,
                reason: "longitude must be between -180 and 180 degrees".into(),
            });
        }

        Ok(Self { lat, lng })
    }

    #[inline]
    pub fn is_valid_latitude(lat: f64) -> bool {
        (Self::MIN_LAT..=Self::MAX_LAT).contains(&lat)
    }

    #[inline]
    pub fn is_valid_longitude(lng: f64) -> bool {
        (Self::MIN_LNG..=Self::MAX_LNG).contains(&lng)
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[inline]
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Convert into a `geo::Point` (x = longitude, y = latitude).
    #[inline]
    pub fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

impl TryFrom<RawLocation> for GeoLocation {
    type Error = GeometryError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl From<GeoLocation> for RawLocation {
    fn from(location: GeoLocation) -> Self {
        Self {
            lat: location.lat,
            lng: location.lng,
        }
    }
}

impl From<GeoLocation> for geo::Point<f64> {
    fn from(location: GeoLocation) -> Self {
        location.to_geo()
    }
}

impl From<GeoLocation> for geo::Coord<f64> {
    fn from(location: GeoLocation) -> Self {
        geo::coord! { x: location.lng, y: location.lat }
    }
}

impl std::fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}
