//! Service configuration.
//!
//! The backend variant is chosen here, explicitly, rather than discovered at
//! runtime.

use crate::keys::KeyLayout;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Which realization of the query contract to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Native spatial indexing: in-process R*-tree with a polygon predicate.
    Native,
    /// Key-value store with geo-indexed sets but no polygon support.
    #[default]
    Emulated,
}

/// How the emulated backend resolves a point to a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryIndexStrategy {
    /// Ray casting runs inside the store as a registered script.
    #[default]
    Scripted,
    /// Polygons are read once at startup and tested in process.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub country_index: CountryIndexStrategy,

    /// Maximum record keys fetched per batched round trip.
    #[serde(default = "Config::default_record_batch_size")]
    pub record_batch_size: usize,

    /// Keys examined per SCAN page inside the containment script.
    #[serde(default = "Config::default_scan_page_size")]
    pub scan_page_size: usize,

    #[serde(default)]
    pub keys: KeyLayout,

    /// Skip seeding when this country's geo-index already exists.
    #[serde(default)]
    pub seed_marker_country: Option<String>,
}

impl Config {
    const fn default_record_batch_size() -> usize {
        64
    }

    const fn default_scan_page_size() -> usize {
        16
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_country_index(mut self, strategy: CountryIndexStrategy) -> Self {
        self.country_index = strategy;
        self
    }

    pub fn with_record_batch_size(mut self, batch_size: usize) -> Self {
        assert!(batch_size > 0, "Record batch size must be greater than zero");
        self.record_batch_size = batch_size;
        self
    }

    pub fn with_scan_page_size(mut self, page_size: usize) -> Self {
        assert!(page_size > 0, "Scan page size must be greater than zero");
        self.scan_page_size = page_size;
        self
    }

    pub fn with_keys(mut self, keys: KeyLayout) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_seed_marker_country(mut self, country: impl Into<String>) -> Self {
        self.seed_marker_country = Some(country.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.record_batch_size == 0 {
            return Err("Record batch size must be greater than zero".to_string());
        }

        if self.scan_page_size == 0 {
            return Err("Scan page size must be greater than zero".to_string());
        }

        if let Some(marker) = &self.seed_marker_country
            && marker.is_empty()
        {
            return Err("Seed marker country cannot be empty".to_string());
        }

        self.keys.validate()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            country_index: CountryIndexStrategy::default(),
            record_batch_size: Self::default_record_batch_size(),
            scan_page_size: Self::default_scan_page_size(),
            keys: KeyLayout::default(),
            seed_marker_country: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Emulated);
        assert_eq!(config.country_index, CountryIndexStrategy::Scripted);
        assert_eq!(config.record_batch_size, 64);
        assert_eq!(config.scan_page_size, 16);
        assert!(config.seed_marker_country.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_backend(BackendKind::Native)
            .with_record_batch_size(8)
            .with_seed_marker_country("France");

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();

        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{"backend":"native"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::Native);
        assert_eq!(config.record_batch_size, 64);
        assert_eq!(config.keys, KeyLayout::default());
    }

    #[test]
    fn test_config_rejects_zero_batch() {
        assert!(Config::from_json(r#"{"record_batch_size":0}"#).is_err());
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        assert!(Config::from_json(r#"{"sync_policy":"always"}"#).is_err());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default().with_country_index(CountryIndexStrategy::InMemory);
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
