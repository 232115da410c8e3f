//! Country-scoped point-of-interest proximity queries.
//!
//! A query's reference point is first resolved to the country whose
//! geofence contains it; the query then runs against that country's POIs
//! only. Two backends implement the same contract: a native in-process
//! spatial index, and an emulated one over a key-value store that offers
//! geo-indexed sets and scripts but no polygon predicate.
//!
//! ```rust
//! use futures::TryStreamExt;
//! use geopoi::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let fence = GeoPolygon::from_lat_lng(&[
//!     (0.0, 0.0),
//!     (0.0, 10.0),
//!     (10.0, 10.0),
//!     (10.0, 0.0),
//!     (0.0, 0.0),
//! ])?;
//! let cafe = PointOfInterest::new("Atlantis", "Cafe", "Food", GeoLocation::new(5.0, 5.0)?);
//! let seed = SeedData::new(vec![Country::new("Atlantis", fence)], vec![cafe]);
//!
//! let service = ServiceBuilder::new().seed_data(seed).build().await?;
//! let request = PoiRequest { lat: 5.0, lng: 5.0, distance_meters: 1.0 };
//! let found: Vec<PoiResponse> = service
//!     .find_pois_by_radius(&request, CancellationToken::new())?
//!     .try_collect()
//!     .await?;
//! assert_eq!(found[0].name, "Cafe");
//! # Ok::<(), GeoPoiError>(())
//! # }).unwrap();
//! ```

pub mod backend;
pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod index;
pub mod keys;
pub mod proximity;
pub mod seed;
pub mod service;
pub mod storage;

pub use builder::ServiceBuilder;
pub use config::{BackendKind, Config, CountryIndexStrategy};
pub use error::{GeoPoiError, Result};

pub use geopoi_types::{
    Country, GeoLocation, GeoPolygon, GeometryError, PointOfInterest, ProximityQuery,
    ProximityResult, Quadrilateral,
};

pub use compute::spatial::{haversine_distance, is_point_in_polygon};

pub use backend::{Backend, EmulatedBackend, NativeBackend};
pub use index::{CountryIndex, InMemoryCountryIndex, ScriptedCountryIndex};
pub use keys::{KeyLayout, KeySpace};
pub use proximity::{ProximityStore, ResultStream};
pub use seed::{SeedData, SeedReport, Seeder};
pub use service::{PoiRequest, PoiRequestWithin, PoiResponse, PoiService};
pub use storage::{GeoStore, MemoryStore, StoreOp, StoreStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, GeoPoiError, Result, ServiceBuilder};

    pub use crate::{Country, GeoLocation, GeoPolygon, PointOfInterest, Quadrilateral};

    pub use crate::{PoiRequest, PoiRequestWithin, PoiResponse, PoiService, SeedData};

    pub use crate::{haversine_distance, is_point_in_polygon};

    pub use crate::{GeoStore, MemoryStore};
}
