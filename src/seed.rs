//! Loading countries and POIs into a store.
//!
//! Seeding writes everything in one batch so that every POI id lands in
//! its country's geo-index and as a record together, or not at all.

use crate::error::{GeoPoiError, Result};
use crate::index::codec;
use crate::keys::KeySpace;
use crate::storage::{GeoStore, StoreOp};
use geopoi_types::{Country, PointOfInterest};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Countries and POIs to seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    pub countries: Vec<Country>,
    pub pois: Vec<PointOfInterest>,
}

impl SeedData {
    pub fn new(countries: Vec<Country>, pois: Vec<PointOfInterest>) -> Self {
        Self { countries, pois }
    }

    pub fn with_country(mut self, country: Country) -> Self {
        self.countries.push(country);
        self
    }

    pub fn with_poi(mut self, poi: PointOfInterest) -> Self {
        self.pois.push(poi);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.pois.is_empty()
    }

    /// Country names must be usable in keys and unique; every POI must
    /// belong to one of the countries.
    pub fn validate(&self, keys: &KeySpace) -> Result<()> {
        let mut names = FxHashSet::default();
        for country in &self.countries {
            keys.validate_country_name(&country.name)?;
            if !names.insert(country.name.as_str()) {
                return Err(GeoPoiError::InvalidInput(format!(
                    "country '{}' is listed twice",
                    country.name
                )));
            }
        }

        let orphan = self
            .pois
            .iter()
            .find(|poi| !names.contains(poi.country.as_str()));
        if let Some(orphan) = orphan {
            return Err(GeoPoiError::InvalidInput(format!(
                "POI '{}' belongs to unknown country '{}'",
                orphan.name, orphan.country
            )));
        }

        Ok(())
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub countries: usize,
    pub pois: usize,
    /// The marker country was already present; nothing was written.
    pub skipped: bool,
}

/// Writes [`SeedData`] into a [`GeoStore`] using the persisted key layout.
pub struct Seeder {
    store: Arc<dyn GeoStore>,
    keys: KeySpace,
    marker: Option<String>,
}

impl Seeder {
    pub fn new(store: Arc<dyn GeoStore>, keys: KeySpace) -> Self {
        Self {
            store,
            keys,
            marker: None,
        }
    }

    /// Skip seeding when this country's geo-index already exists.
    pub fn with_marker(mut self, country: Option<String>) -> Self {
        self.marker = country;
        self
    }

    pub async fn seed(&self, data: &SeedData) -> Result<SeedReport> {
        data.validate(&self.keys)?;

        if let Some(marker) = &self.marker {
            if self.store.exists(&self.keys.geo_pois_key(marker)).await? {
                log::info!("Seed marker '{}' present, skipping seeding", marker);
                return Ok(SeedReport {
                    skipped: true,
                    ..SeedReport::default()
                });
            }
        }

        let ops = self.operations(data)?;
        log::debug!("Seeding {} writes in one batch", ops.len());
        self.store.apply(ops).await?;

        log::info!(
            "Seeded {} countries and {} POIs",
            data.countries.len(),
            data.pois.len()
        );
        Ok(SeedReport {
            countries: data.countries.len(),
            pois: data.pois.len(),
            skipped: false,
        })
    }

    fn operations(&self, data: &SeedData) -> Result<Vec<StoreOp>> {
        let mut ops = Vec::new();

        for country in &data.countries {
            ops.push(StoreOp::Set {
                key: self.keys.country_key(&country.id),
                value: serde_json::to_vec(country)?.into(),
            });

            // Drop fields left over from a previous, longer geofence.
            let fence_key = self.keys.geofence_key(&country.name);
            ops.push(StoreOp::Delete {
                key: fence_key.clone(),
            });
            ops.extend(
                codec::encode_polygon(&country.geofence)
                    .into_iter()
                    .map(|(field, value)| StoreOp::HashSet {
                        key: fence_key.clone(),
                        field,
                        value,
                    }),
            );
        }

        for poi in &data.pois {
            let id = poi.id.to_string();
            ops.push(StoreOp::GeoAdd {
                key: self.keys.geo_pois_key(&poi.country),
                member: id.clone(),
                location: poi.location,
            });
            ops.push(StoreOp::Set {
                key: self.keys.poi_key(&poi.country, &id),
                value: serde_json::to_vec(poi)?.into(),
            });
        }

        Ok(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyLayout;
    use crate::storage::MemoryStore;
    use geopoi_types::{GeoLocation, GeoPolygon};

    fn atlantis() -> Country {
        let fence = GeoPolygon::from_lat_lng(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ])
        .unwrap();
        Country::new("Atlantis", fence)
    }

    fn cafe() -> PointOfInterest {
        PointOfInterest::new("Atlantis", "Cafe", "Food", GeoLocation::new(5.0, 5.0).unwrap())
    }

    fn keys() -> KeySpace {
        KeySpace::new(KeyLayout::default()).unwrap()
    }

    #[tokio::test]
    async fn test_seed_writes_every_key() {
        let store = MemoryStore::shared();
        let country = atlantis();
        let poi = cafe();
        let data = SeedData::default()
            .with_country(country.clone())
            .with_poi(poi.clone());

        let report = Seeder::new(store.clone(), keys()).seed(&data).await.unwrap();
        assert_eq!(report.countries, 1);
        assert_eq!(report.pois, 1);
        assert!(!report.skipped);

        assert!(store.exists(&format!("Countries:{}", country.id)).await.unwrap());
        let fence = store.hash_get_all("GeoFencePolygon:Atlantis").await.unwrap();
        assert_eq!(fence.len(), 5);
        assert!(store.exists("GeoPois:Atlantis").await.unwrap());

        let raw = store
            .get(&format!("POIs:Atlantis:{}", poi.id))
            .await
            .unwrap()
            .unwrap();
        let stored: PointOfInterest = serde_json::from_slice(&raw).unwrap();
        assert_eq!(stored, poi);
    }

    #[tokio::test]
    async fn test_marker_makes_seeding_idempotent() {
        let store = MemoryStore::shared();
        let data = SeedData::new(vec![atlantis()], vec![cafe()]);
        let seeder = Seeder::new(store.clone(), keys()).with_marker(Some("Atlantis".into()));

        assert!(!seeder.seed(&data).await.unwrap().skipped);
        let keys_after_first = store.stats().key_count;

        let again = SeedData::new(vec![atlantis()], vec![cafe()]);
        assert!(seeder.seed(&again).await.unwrap().skipped);
        assert_eq!(store.stats().key_count, keys_after_first);
    }

    #[tokio::test]
    async fn test_orphan_poi_rejected() {
        let store = MemoryStore::shared();
        let orphan =
            PointOfInterest::new("Lemuria", "Cafe", "Food", GeoLocation::new(1.0, 1.0).unwrap());
        let data = SeedData::new(vec![atlantis()], vec![orphan]);

        let err = Seeder::new(store.clone(), keys())
            .seed(&data)
            .await
            .unwrap_err();
        assert!(matches!(err, GeoPoiError::InvalidInput(_)));
        assert_eq!(store.stats().key_count, 0);
    }

    #[test]
    fn test_duplicate_country_rejected() {
        let data = SeedData::new(vec![atlantis(), atlantis()], Vec::new());
        assert!(data.validate(&keys()).is_err());
    }

    #[test]
    fn test_country_name_with_separator_rejected() {
        let mut country = atlantis();
        country.name = "North:Atlantis".into();
        let data = SeedData::new(vec![country], Vec::new());
        assert!(data.validate(&keys()).is_err());
    }
}
