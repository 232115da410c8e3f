//! In-process realization of [`GeoStore`].

use super::geo_set::{GeoHit, GeoSet};
use super::script::{
    ScriptArgs, ScriptContext, ScriptDigest, ScriptRegistry, ScriptValue, StoreScript,
};
use super::{GeoStore, ScanCursor, ScanPage, StoreOp, StoreStats};
use crate::error::{GeoPoiError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use geopoi_types::GeoLocation;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

enum Entry {
    Text(Bytes),
    Hash(BTreeMap<String, Bytes>),
    Geo(GeoSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Text,
    Hash,
    Geo,
    Absent,
}

impl EntryKind {
    fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Hash => "hash",
            Self::Geo => "geo",
            Self::Absent => "none",
        }
    }
}

impl Entry {
    fn kind(&self) -> EntryKind {
        match self {
            Self::Text(_) => EntryKind::Text,
            Self::Hash(_) => EntryKind::Hash,
            Self::Geo(_) => EntryKind::Geo,
        }
    }
}

fn wrong_type(key: &str, expected: EntryKind, found: EntryKind) -> GeoPoiError {
    GeoPoiError::Store(format!(
        "WRONGTYPE key '{}' holds a {} value, expected {}",
        key,
        found.name(),
        expected.name()
    ))
}

/// Key-ordered data; also the context scripts run against.
#[derive(Default)]
struct Keyspace {
    entries: BTreeMap<String, Entry>,
}

impl Keyspace {
    fn kind_of(&self, key: &str) -> EntryKind {
        self.entries.get(key).map_or(EntryKind::Absent, Entry::kind)
    }

    fn text(&self, key: &str) -> Result<Option<Bytes>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Text(value)) => Ok(Some(value.clone())),
            Some(other) => Err(wrong_type(key, EntryKind::Text, other.kind())),
        }
    }

    fn geo(&self, key: &str) -> Result<Option<&GeoSet>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Geo(set)) => Ok(Some(set)),
            Some(other) => Err(wrong_type(key, EntryKind::Geo, other.kind())),
        }
    }

    fn hash_mut(&mut self, key: &str) -> Result<&mut BTreeMap<String, Bytes>> {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()));
        match entry {
            Entry::Hash(map) => Ok(map),
            other => Err(wrong_type(key, EntryKind::Hash, other.kind())),
        }
    }

    fn geo_mut(&mut self, key: &str) -> Result<&mut GeoSet> {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Geo(GeoSet::new()));
        match entry {
            Entry::Geo(set) => Ok(set),
            other => Err(wrong_type(key, EntryKind::Geo, other.kind())),
        }
    }

    fn set_text(&mut self, key: &str, value: Bytes) {
        self.entries.insert(key.to_string(), Entry::Text(value));
    }

    /// Type-checks a whole batch before any of it is applied.
    fn check_batch(&self, ops: &[StoreOp]) -> Result<()> {
        let mut staged: FxHashMap<&str, EntryKind> = FxHashMap::default();

        for op in ops {
            let (key, wanted) = match op {
                StoreOp::Set { key, .. } => {
                    staged.insert(key.as_str(), EntryKind::Text);
                    continue;
                }
                StoreOp::Delete { key } => {
                    staged.insert(key.as_str(), EntryKind::Absent);
                    continue;
                }
                StoreOp::HashSet { key, .. } => (key.as_str(), EntryKind::Hash),
                StoreOp::GeoAdd { key, .. } => (key.as_str(), EntryKind::Geo),
            };

            let current = staged
                .get(key)
                .copied()
                .unwrap_or_else(|| self.kind_of(key));
            if current != EntryKind::Absent && current != wanted {
                return Err(wrong_type(key, wanted, current));
            }
            staged.insert(key, wanted);
        }

        Ok(())
    }

    fn apply(&mut self, ops: Vec<StoreOp>) -> Result<()> {
        self.check_batch(&ops)?;

        for op in ops {
            match op {
                StoreOp::Set { key, value } => self.set_text(&key, value),
                StoreOp::HashSet { key, field, value } => {
                    self.hash_mut(&key)?.insert(field, value);
                }
                StoreOp::GeoAdd {
                    key,
                    member,
                    location,
                } => {
                    self.geo_mut(&key)?.add(member, location);
                }
                StoreOp::Delete { key } => {
                    self.entries.remove(&key);
                }
            }
        }

        Ok(())
    }
}

impl ScriptContext for Keyspace {
    fn scan(&self, cursor: &ScanCursor, prefix: &str, count: usize) -> Result<ScanPage> {
        if count == 0 {
            return Err(GeoPoiError::InvalidInput(
                "scan count must be greater than zero".into(),
            ));
        }

        let lower = match cursor {
            ScanCursor::Start => Bound::Included(prefix),
            ScanCursor::After(key) => Bound::Excluded(key.as_str()),
            ScanCursor::Done => return Ok(ScanPage::done(Vec::new())),
        };

        // Keys sharing a prefix are contiguous in key order.
        let mut matching = self
            .entries
            .range::<str, _>((lower, Bound::Unbounded))
            .map(|(key, _)| key)
            .skip_while(|key| key.as_str() < prefix)
            .take_while(|key| key.starts_with(prefix));

        let keys: Vec<String> = matching.by_ref().take(count).cloned().collect();
        let more = matching.next().is_some();

        let next = match keys.last() {
            Some(last) if more => ScanCursor::After(last.clone()),
            _ => ScanCursor::Done,
        };

        Ok(ScanPage { keys, next })
    }

    fn hash_get_all(&self, key: &str) -> Result<Vec<(String, Bytes)>> {
        match self.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Hash(map)) => Ok(map
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect()),
            Some(other) => Err(wrong_type(key, EntryKind::Hash, other.kind())),
        }
    }
}

/// Thread-safe in-memory store with geo-indexed sets and a script registry.
///
/// # Examples
///
/// ```rust
/// use geopoi::storage::{GeoStore, MemoryStore};
/// use geopoi_types::GeoLocation;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = MemoryStore::shared();
/// let louvre = GeoLocation::new(48.8606, 2.3376)?;
/// store.geo_add("GeoPois:France", "louvre", louvre).await?;
///
/// let center = GeoLocation::new(48.8566, 2.3522)?;
/// let hits = store.geo_radius("GeoPois:France", center, 2_000.0).await?;
/// assert_eq!(hits[0].member, "louvre");
/// # Ok::<(), geopoi::GeoPoiError>(())
/// # }).unwrap();
/// ```
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Keyspace>,
    scripts: ScriptRegistry,
    operations: AtomicU64,
    evaluations: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new store behind the shared handle type services expect.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Forget every loaded script, as a store restart would.
    pub fn flush_scripts(&self) {
        self.scripts.flush();
    }

    fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl GeoStore for MemoryStore {
    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        self.record_operation();
        self.data.write().set_text(key, value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.record_operation();
        self.data.read().text(key)
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<(String, Option<Bytes>)>> {
        self.record_operation();
        let data = self.data.read();
        keys.iter()
            .map(|key| Ok((key.clone(), data.text(key)?)))
            .collect()
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.record_operation();
        Ok(self.data.write().entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.record_operation();
        Ok(self.data.read().entries.contains_key(key))
    }

    async fn hash_set(&self, key: &str, field: &str, value: Bytes) -> Result<()> {
        self.record_operation();
        self.data
            .write()
            .hash_mut(key)?
            .insert(field.to_string(), value);
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, Bytes)>> {
        self.record_operation();
        self.data.read().hash_get_all(key)
    }

    async fn geo_add(&self, key: &str, member: &str, location: GeoLocation) -> Result<bool> {
        self.record_operation();
        Ok(self.data.write().geo_mut(key)?.add(member, location))
    }

    async fn geo_remove(&self, key: &str, member: &str) -> Result<bool> {
        self.record_operation();
        let mut data = self.data.write();
        if data.kind_of(key) == EntryKind::Absent {
            return Ok(false);
        }
        Ok(data.geo_mut(key)?.remove(member))
    }

    async fn geo_radius(
        &self,
        key: &str,
        center: GeoLocation,
        meters: f64,
    ) -> Result<Vec<GeoHit>> {
        self.record_operation();
        let data = self.data.read();
        Ok(data
            .geo(key)?
            .map(|set| set.radius(&center, meters))
            .unwrap_or_default())
    }

    async fn geo_search_box(
        &self,
        key: &str,
        center: GeoLocation,
        width: f64,
        height: f64,
    ) -> Result<Vec<GeoHit>> {
        self.record_operation();
        let data = self.data.read();
        Ok(data
            .geo(key)?
            .map(|set| set.search_box(&center, width, height))
            .unwrap_or_default())
    }

    async fn scan(&self, cursor: ScanCursor, prefix: &str, count: usize) -> Result<ScanPage> {
        self.record_operation();
        self.data.read().scan(&cursor, prefix, count)
    }

    async fn apply(&self, ops: Vec<StoreOp>) -> Result<()> {
        self.record_operation();
        self.data.write().apply(ops)
    }

    async fn script_load(&self, script: Arc<dyn StoreScript>) -> Result<ScriptDigest> {
        self.record_operation();
        self.scripts.load(script)
    }

    async fn eval(&self, digest: &ScriptDigest, args: &ScriptArgs) -> Result<ScriptValue> {
        self.record_operation();
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let data = self.data.read();
        self.scripts.eval(digest, &*data, args)
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            key_count: self.data.read().entries.len(),
            operations_count: self.operations.load(Ordering::Relaxed),
            script_evaluations: self.evaluations.load(Ordering::Relaxed),
        }
    }
}
