use super::{CountryIndex, codec};
use crate::compute::spatial::is_point_in_polygon;
use crate::error::{GeoPoiError, Result};
use crate::keys::KeySpace;
use crate::storage::{GeoStore, ScanCursor};
use async_trait::async_trait;
use geopoi_types::{Country, GeoLocation, GeoPolygon};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Immutable snapshot of every country geofence.
///
/// Built once and shared read-only between concurrent queries. A snapshot
/// never changes after construction; reloading means building a new one.
#[derive(Debug, Clone, Default)]
pub struct CountryPolygons {
    entries: Vec<(String, GeoPolygon)>,
}

impl CountryPolygons {
    pub fn from_countries<'a>(countries: impl IntoIterator<Item = &'a Country>) -> Self {
        Self {
            entries: countries
                .into_iter()
                .map(|c| (c.name.clone(), c.geofence.clone()))
                .collect(),
        }
    }

    /// Read every stored geofence, in key order.
    pub async fn load(store: &dyn GeoStore, keys: &KeySpace, page_size: usize) -> Result<Self> {
        let prefix = keys.geofence_scan_prefix();
        let mut cursor = ScanCursor::Start;
        let mut entries = Vec::new();

        loop {
            let page = store.scan(cursor, &prefix, page_size).await?;
            for key in &page.keys {
                let Some(country) = keys.country_from_geofence_key(key) else {
                    continue;
                };
                let fields = store.hash_get_all(key).await?;
                entries.push((country.to_string(), codec::decode_polygon(key, &fields)?));
            }
            if page.is_last() {
                break;
            }
            cursor = page.next;
        }

        log::info!("Loaded {} country geofences", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// First country whose geofence contains `point`.
    pub fn locate(&self, point: &GeoLocation) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, polygon)| is_point_in_polygon(point, polygon))
            .map(|(name, _)| name.as_str())
    }
}

/// Country index over a local geofence snapshot.
#[derive(Debug, Clone)]
pub struct InMemoryCountryIndex {
    polygons: Arc<CountryPolygons>,
}

impl InMemoryCountryIndex {
    pub fn new(polygons: CountryPolygons) -> Self {
        Self {
            polygons: Arc::new(polygons),
        }
    }

    pub fn polygons(&self) -> &CountryPolygons {
        &self.polygons
    }
}

#[async_trait]
impl CountryIndex for InMemoryCountryIndex {
    async fn resolve(
        &self,
        point: GeoLocation,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        if cancel.is_cancelled() {
            return Err(GeoPoiError::Cancelled);
        }
        Ok(self.polygons.locate(&point).map(str::to_string))
    }
}
