//! Service builder.
//!
//! Assembles a [`PoiService`] from a [`Config`], an optional shared store
//! handle and optional seed data.

use crate::backend::{Backend, EmulatedBackend, NativeBackend};
use crate::config::{BackendKind, Config};
use crate::error::{GeoPoiError, Result};
use crate::keys::KeySpace;
use crate::seed::SeedData;
use crate::service::PoiService;
use crate::storage::{GeoStore, MemoryStore};
use std::sync::Arc;

pub struct ServiceBuilder {
    config: Config,
    store: Option<Arc<dyn GeoStore>>,
    seed: Option<SeedData>,
}

impl ServiceBuilder {
    /// Default configuration: emulated backend over a fresh in-process store.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            store: None,
            seed: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use an existing store handle instead of a fresh [`MemoryStore`].
    /// Ignored by the native backend.
    pub fn store(mut self, store: Arc<dyn GeoStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn seed_data(mut self, data: SeedData) -> Self {
        self.seed = Some(data);
        self
    }

    pub async fn build(self) -> Result<PoiService> {
        self.config.validate().map_err(GeoPoiError::Config)?;

        let backend = match self.config.backend {
            BackendKind::Native => {
                if self.store.is_some() {
                    log::warn!("Native backend ignores the configured store");
                }
                let keys = KeySpace::new(self.config.keys.clone())?;
                let data = self.seed.unwrap_or_default();
                Backend::Native(NativeBackend::seeded(&data, &keys)?)
            }
            BackendKind::Emulated => {
                let store: Arc<dyn GeoStore> = match self.store {
                    Some(store) => store,
                    None => MemoryStore::shared(),
                };
                Backend::Emulated(
                    EmulatedBackend::connect(store, &self.config, self.seed.as_ref()).await?,
                )
            }
        };

        log::info!("Built POI service on the {:?} backend", backend.kind());
        Ok(PoiService::new(backend))
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountryIndexStrategy;
    use crate::storage::StoreOp;

    #[tokio::test]
    async fn test_builder_default() {
        let service = ServiceBuilder::new().build().await.unwrap();
        assert_eq!(service.backend().kind(), BackendKind::Emulated);
    }

    #[tokio::test]
    async fn test_builder_native() {
        let config = Config::default().with_backend(BackendKind::Native);
        let service = ServiceBuilder::new().config(config).build().await.unwrap();
        assert_eq!(service.backend().kind(), BackendKind::Native);
    }

    #[tokio::test]
    async fn test_builder_shares_store() {
        let store = MemoryStore::shared();
        store
            .apply(vec![StoreOp::Set {
                key: "unrelated".into(),
                value: bytes::Bytes::from_static(b"x"),
            }])
            .await
            .unwrap();

        let config = Config::default().with_country_index(CountryIndexStrategy::InMemory);
        ServiceBuilder::new()
            .config(config)
            .store(store.clone())
            .build()
            .await
            .unwrap();
        assert!(store.exists("unrelated").await.unwrap());
    }

    #[tokio::test]
    async fn test_builder_rejects_invalid_config() {
        let mut config = Config::default();
        config.scan_page_size = 0;
        assert!(ServiceBuilder::new().config(config).build().await.is_err());
    }
}
