//! Storage capability for the index-emulating backend.
//!
//! [`GeoStore`] is the contract of a key-value store that offers text
//! records, hashes, geo-indexed sets and server-side scripts, but no
//! polygon predicates. The process holds one shared handle
//! (`Arc<dyn GeoStore>`); no operation takes an exclusive lock on it.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use geopoi_types::GeoLocation;
use std::sync::Arc;

mod geo_set;
mod memory;
pub mod script;

pub use geo_set::{GeoHit, GeoMember, GeoSet};
pub use memory::MemoryStore;
pub use script::{
    ScriptArgs, ScriptContext, ScriptDigest, ScriptRegistry, ScriptValue, StoreScript,
};

/// Position of an in-progress key scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanCursor {
    #[default]
    Start,
    /// Resume after this key.
    After(String),
    Done,
}

/// One page of a key scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage {
    pub keys: Vec<String>,
    pub next: ScanCursor,
}

impl ScanPage {
    pub fn done(keys: Vec<String>) -> Self {
        Self {
            keys,
            next: ScanCursor::Done,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next == ScanCursor::Done
    }
}

/// Write operation for batch processing
#[derive(Debug, Clone)]
pub enum StoreOp {
    /// Set a text record
    Set { key: String, value: Bytes },
    /// Set one hash field
    HashSet {
        key: String,
        field: String,
        value: Bytes,
    },
    /// Add or move a geo-set member
    GeoAdd {
        key: String,
        member: String,
        location: GeoLocation,
    },
    /// Delete a key of any type
    Delete { key: String },
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of keys
    pub key_count: usize,
    /// Number of commands served, batches counting once
    pub operations_count: u64,
    /// Number of script evaluations
    pub script_evaluations: u64,
}

#[async_trait]
pub trait GeoStore: Send + Sync {
    async fn set(&self, key: &str, value: Bytes) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Fetch several text records in one round trip.
    ///
    /// Each value is returned next to the key it was read from.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<Bytes>)>>;

    /// Delete a key and report whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    async fn hash_set(&self, key: &str, field: &str, value: Bytes) -> Result<()>;

    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, Bytes)>>;

    /// Add or move a member. Returns `true` if the member is new.
    async fn geo_add(&self, key: &str, member: &str, location: GeoLocation) -> Result<bool>;

    async fn geo_remove(&self, key: &str, member: &str) -> Result<bool>;

    /// Members within `meters` of `center`, nearest first.
    async fn geo_radius(&self, key: &str, center: GeoLocation, meters: f64)
    -> Result<Vec<GeoHit>>;

    /// Members inside a `width` x `height` meter box centered on `center`.
    async fn geo_search_box(
        &self,
        key: &str,
        center: GeoLocation,
        width: f64,
        height: f64,
    ) -> Result<Vec<GeoHit>>;

    /// Keys starting with `prefix`, at most `count` per page, in key order.
    async fn scan(&self, cursor: ScanCursor, prefix: &str, count: usize) -> Result<ScanPage>;

    /// Apply a batch of writes atomically.
    async fn apply(&self, ops: Vec<StoreOp>) -> Result<()>;

    /// Compile and register a script; idempotent.
    async fn script_load(&self, script: Arc<dyn StoreScript>) -> Result<ScriptDigest>;

    async fn eval(&self, digest: &ScriptDigest, args: &ScriptArgs) -> Result<ScriptValue>;

    fn stats(&self) -> StoreStats;
}
