//! # geopoi-types
//!
//! Geographic value types shared by every `geopoi` backend.
//!
//! - **Locations**: [`GeoLocation`], a validated (latitude, longitude) pair
//! - **Polygons**: [`GeoPolygon`] (explicitly closed ring) and [`Quadrilateral`]
//! - **Records**: [`Country`] with its geofence, [`PointOfInterest`]
//! - **Queries**: [`ProximityQuery`] and the [`ProximityResult`] it yields
//!
//! Coordinates are always given latitude first. The only place where the
//! order flips to (x = longitude, y = latitude) is the conversion into `geo`
//! crate primitives.
//!
//! ```rust
//! use geopoi_types::{GeoLocation, GeoPolygon};
//!
//! let square = GeoPolygon::new(vec![
//!     GeoLocation::new(0.0, 0.0)?,
//!     GeoLocation::new(0.0, 10.0)?,
//!     GeoLocation::new(10.0, 10.0)?,
//!     GeoLocation::new(10.0, 0.0)?,
//!     GeoLocation::new(0.0, 0.0)?,
//! ])?;
//! assert_eq!(square.vertex_count(), 5);
//! # Ok::<(), geopoi_types::GeometryError>(())
//! ```

pub mod error;
pub mod point;
pub mod polygon;
pub mod record;
pub mod query;

pub use error::GeometryError;
pub use point::GeoLocation;
pub use polygon::{GeoPolygon, Quadrilateral};
pub use query::{ProximityQuery, ProximityResult};
pub use record::{Country, PointOfInterest};
