//! Backend capability variants.
//!
//! A backend pairs a [`CountryIndex`] with a [`ProximityStore`]. Which one
//! runs is a [`Config`] decision made once at startup.

use crate::config::{BackendKind, Config, CountryIndexStrategy};
use crate::error::{GeoPoiError, Result};
use crate::index::{CountryIndex, CountryPolygons, InMemoryCountryIndex, ScriptedCountryIndex};
use crate::keys::KeySpace;
use crate::proximity::{GeoIndexedProximityStore, NativeProximityStore, ProximityStore};
use crate::seed::{SeedData, SeedReport, Seeder};
use crate::storage::GeoStore;
use std::sync::Arc;

pub enum Backend {
    Native(NativeBackend),
    Emulated(EmulatedBackend),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Native(_) => BackendKind::Native,
            Self::Emulated(_) => BackendKind::Emulated,
        }
    }

    pub fn country_index(&self) -> &dyn CountryIndex {
        match self {
            Self::Native(native) => &native.countries,
            Self::Emulated(emulated) => emulated.countries.as_ref(),
        }
    }

    pub fn proximity(&self) -> &dyn ProximityStore {
        match self {
            Self::Native(native) => &native.pois,
            Self::Emulated(emulated) => &emulated.pois,
        }
    }
}

/// Everything in process: geofences in memory, POIs in per-country
/// R*-trees with a native polygon predicate.
pub struct NativeBackend {
    countries: InMemoryCountryIndex,
    pois: NativeProximityStore,
}

impl NativeBackend {
    pub fn seeded(data: &SeedData, keys: &KeySpace) -> Result<Self> {
        data.validate(keys)?;

        let pois = NativeProximityStore::new();
        for poi in &data.pois {
            pois.insert(poi.clone());
        }
        log::info!(
            "Native backend seeded with {} countries and {} POIs",
            data.countries.len(),
            data.pois.len()
        );

        Ok(Self {
            countries: InMemoryCountryIndex::new(CountryPolygons::from_countries(&data.countries)),
            pois,
        })
    }

    pub fn pois(&self) -> &NativeProximityStore {
        &self.pois
    }
}

/// A key-value store with geo-indexed sets and scripts but no polygon
/// support. Containment is either scripted inside the store or computed
/// from a startup snapshot; polygon queries fall back to box scans.
pub struct EmulatedBackend {
    store: Arc<dyn GeoStore>,
    keys: KeySpace,
    countries: Box<dyn CountryIndex>,
    pois: GeoIndexedProximityStore,
    seed_report: SeedReport,
}

impl EmulatedBackend {
    /// Register scripts, seed, then build the country index.
    ///
    /// Script registration comes first: if it fails nothing is written and
    /// the service does not start.
    pub async fn connect(
        store: Arc<dyn GeoStore>,
        config: &Config,
        seed: Option<&SeedData>,
    ) -> Result<Self> {
        config.validate().map_err(GeoPoiError::Config)?;
        let keys = KeySpace::new(config.keys.clone())?;

        let scripted = match config.country_index {
            CountryIndexStrategy::Scripted => Some(
                ScriptedCountryIndex::register(store.clone(), keys.clone(), config.scan_page_size)
                    .await?,
            ),
            CountryIndexStrategy::InMemory => None,
        };

        let seed_report = match seed {
            Some(data) => {
                Seeder::new(store.clone(), keys.clone())
                    .with_marker(config.seed_marker_country.clone())
                    .seed(data)
                    .await?
            }
            None => SeedReport::default(),
        };

        let countries: Box<dyn CountryIndex> = match scripted {
            Some(index) => Box::new(index),
            None => {
                let polygons =
                    CountryPolygons::load(store.as_ref(), &keys, config.scan_page_size).await?;
                Box::new(InMemoryCountryIndex::new(polygons))
            }
        };

        let pois = GeoIndexedProximityStore::new(
            store.clone(),
            keys.clone(),
            config.record_batch_size,
        );

        Ok(Self {
            store,
            keys,
            countries,
            pois,
            seed_report,
        })
    }

    pub fn store(&self) -> &Arc<dyn GeoStore> {
        &self.store
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    pub fn seed_report(&self) -> SeedReport {
        self.seed_report
    }
}
