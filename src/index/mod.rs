//! Country resolution: which country's geofence contains a point.
//!
//! Geofences are assumed disjoint. The assumption is not validated; when it
//! is violated, the first match in each strategy's stable iteration order
//! wins.

use crate::error::Result;
use async_trait::async_trait;
use geopoi_types::GeoLocation;
use tokio_util::sync::CancellationToken;

pub mod codec;
mod in_memory;
mod scripted;

pub use in_memory::{CountryPolygons, InMemoryCountryIndex};
pub use scripted::{RayCastingScript, ScriptedCountryIndex};

#[async_trait]
pub trait CountryIndex: Send + Sync {
    /// Name of the country containing `point`, or `None` when no geofence
    /// does. "Not found" is a normal outcome, not an error.
    async fn resolve(
        &self,
        point: GeoLocation,
        cancel: &CancellationToken,
    ) -> Result<Option<String>>;
}
