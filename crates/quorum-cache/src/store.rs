//! The cache store.
//!
//! A shared, cheap-clone handle over a map of [`CacheKey`] → [`Entry`].
//! Entries carry a JSON value and a freshness flag; invalidation marks a
//! whole scope stale so the next read refetches, which is the eventual-
//! consistency backstop of the mutation protocol.
//!
//! In-flight reads register through [`CacheStore::begin_fetch`]; a
//! mutation's first step cancels them per scope, turning the eventual
//! [`FetchGuard::commit`] into a no-op so a stale response cannot
//! overwrite an optimistic write.
//!
//! Concurrency model: the store is shared mutable state with
//! last-writer-wins semantics and no transactional isolation. There is
//! deliberately no locking across a whole mutation — coordination between
//! simultaneous mutations is out of scope.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use quorum_core::{Error, Result};

use crate::key::CacheKey;

/// Freshness of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Usable as-is.
    Fresh,
    /// Usable for display, but the next read must refetch.
    Stale,
}

/// One cached view: a JSON value plus its freshness.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub value: Value,
    pub freshness: Freshness,
}

/// A verbatim capture of a set of cache slots, for rollback.
///
/// Absent slots are captured as `None`, so restoring also deletes
/// entries the mutation created after the snapshot was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Vec<(CacheKey, Option<Entry>)>);

impl Snapshot {
    /// Number of captured slots.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Default)]
struct StoreInner {
    entries: HashMap<CacheKey, Entry>,
    /// Per-scope cancellation epoch. Bumping it detaches every fetch
    /// guard issued under the previous epoch.
    fetch_epochs: HashMap<String, u64>,
}

/// The client cache store. Cheap to clone (Arc internals).
#[derive(Clone, Default)]
pub struct CacheStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl CacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raw JSON value at `key`, if present.
    pub fn get_value(&self, key: &CacheKey) -> Option<Value> {
        self.read().entries.get(key).map(|e| e.value.clone())
    }

    /// Typed read of the entry at `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        match self.get_value(key) {
            Some(value) => Ok(Some(serde_json::from_value(value).map_err(Error::decode)?)),
            None => Ok(None),
        }
    }

    /// Typed write: stores the encoded value and marks the entry fresh.
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(Error::encode)?;
        self.set_value(key.clone(), value);
        Ok(())
    }

    /// Raw write: stores the value and marks the entry fresh.
    pub fn set_value(&self, key: CacheKey, value: Value) {
        self.write().entries.insert(
            key,
            Entry {
                value,
                freshness: Freshness::Fresh,
            },
        );
    }

    /// Remove the entry at `key`, returning it if present.
    pub fn remove(&self, key: &CacheKey) -> Option<Entry> {
        self.write().entries.remove(key)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.read().entries.contains_key(key)
    }

    /// Returns `true` if the entry exists and has been invalidated.
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.read()
            .entries
            .get(key)
            .map(|e| e.freshness == Freshness::Stale)
            .unwrap_or(false)
    }

    /// Mark one entry stale.
    pub fn invalidate(&self, key: &CacheKey) {
        if let Some(entry) = self.write().entries.get_mut(key) {
            entry.freshness = Freshness::Stale;
        }
    }

    /// Mark every entry under `scope` stale. The next read of any of
    /// them must refetch.
    pub fn invalidate_scope(&self, scope: &str) {
        let mut inner = self.write();
        let mut stale = 0usize;
        for (key, entry) in inner.entries.iter_mut() {
            if key.in_scope(scope) {
                entry.freshness = Freshness::Stale;
                stale += 1;
            }
        }
        log::debug!("invalidated {stale} cached view(s) under '{scope}'");
    }

    /// Every key currently cached under `scope`.
    pub fn keys_in_scope(&self, scope: &str) -> Vec<CacheKey> {
        self.read()
            .entries
            .keys()
            .filter(|k| k.in_scope(scope))
            .cloned()
            .collect()
    }

    /// Capture the listed slots verbatim, present or absent.
    pub fn snapshot(&self, keys: &[CacheKey]) -> Snapshot {
        let inner = self.read();
        Snapshot(
            keys.iter()
                .map(|k| (k.clone(), inner.entries.get(k).cloned()))
                .collect(),
        )
    }

    /// Restore a snapshot verbatim: captured entries are written back,
    /// captured absences are deleted.
    pub fn restore(&self, snapshot: Snapshot) {
        let mut inner = self.write();
        for (key, entry) in snapshot.0 {
            match entry {
                Some(entry) => {
                    inner.entries.insert(key, entry);
                }
                None => {
                    inner.entries.remove(&key);
                }
            }
        }
    }

    /// Register an in-flight read for `scope`.
    ///
    /// The returned guard commits its response into the cache only if no
    /// [`CacheStore::cancel_pending`] for the scope happened in between.
    pub fn begin_fetch(&self, scope: &str) -> FetchGuard {
        let epoch = *self.read().fetch_epochs.get(scope).unwrap_or(&0);
        FetchGuard {
            store: self.clone(),
            scope: scope.to_string(),
            epoch,
        }
    }

    /// Cancel every in-flight read registered for `scope`.
    pub fn cancel_pending(&self, scope: &str) {
        let mut inner = self.write();
        *inner.fetch_epochs.entry(scope.to_string()).or_insert(0) += 1;
    }

    fn current_epoch(&self, scope: &str) -> u64 {
        *self.read().fetch_epochs.get(scope).unwrap_or(&0)
    }
}

/// Handle for one in-flight read. See [`CacheStore::begin_fetch`].
pub struct FetchGuard {
    store: CacheStore,
    scope: String,
    epoch: u64,
}

impl FetchGuard {
    /// Returns `true` if the read was cancelled after this guard was
    /// issued.
    pub fn is_cancelled(&self) -> bool {
        self.store.current_epoch(&self.scope) != self.epoch
    }

    /// Commit the fetched value, unless the read was cancelled.
    ///
    /// Returns `true` if the value was written.
    pub fn commit<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<bool> {
        if self.is_cancelled() {
            log::debug!("dropping cancelled fetch for '{key}'");
            return Ok(false);
        }
        self.store.set(key, value)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::RecordId;

    fn detail(n: i64) -> CacheKey {
        CacheKey::detail("igps", RecordId::Confirmed(n))
    }

    #[test]
    fn test_set_get_round_trip() {
        let store = CacheStore::new();
        let key = detail(1);
        store.set(&key, &serde_json::json!({ "name": "Food stall" })).unwrap();

        let value: Option<Value> = store.get(&key).unwrap();
        assert_eq!(value.unwrap()["name"], "Food stall");
        assert!(!store.is_stale(&key));
    }

    #[test]
    fn test_clone_shares_state() {
        let a = CacheStore::new();
        let b = a.clone();
        a.set(&detail(1), &1u32).unwrap();
        assert!(b.contains(&detail(1)));
    }

    #[test]
    fn test_invalidate_scope_marks_stale_and_is_observable() {
        let store = CacheStore::new();
        store.set(&detail(1), &1u32).unwrap();
        store.set(&detail(2), &2u32).unwrap();
        store
            .set(&CacheKey::detail("violations", RecordId::Confirmed(1)), &3u32)
            .unwrap();

        store.invalidate_scope("igps");

        assert!(store.is_stale(&detail(1)));
        assert!(store.is_stale(&detail(2)));
        assert!(!store.is_stale(&CacheKey::detail("violations", RecordId::Confirmed(1))));
    }

    #[test]
    fn test_fresh_write_clears_staleness() {
        let store = CacheStore::new();
        let key = detail(1);
        store.set(&key, &1u32).unwrap();
        store.invalidate(&key);
        assert!(store.is_stale(&key));

        store.set(&key, &2u32).unwrap();
        assert!(!store.is_stale(&key));
    }

    #[test]
    fn test_snapshot_restore_is_verbatim() {
        let store = CacheStore::new();
        let kept = detail(1);
        let absent = detail(2);
        store.set(&kept, &"before").unwrap();
        store.invalidate(&kept);

        let snapshot = store.snapshot(&[kept.clone(), absent.clone()]);
        assert_eq!(snapshot.len(), 2);

        // Mutate both slots, then roll back.
        store.set(&kept, &"after").unwrap();
        store.set(&absent, &"created").unwrap();
        store.restore(snapshot);

        assert_eq!(store.get_value(&kept).unwrap(), serde_json::json!("before"));
        assert!(store.is_stale(&kept), "freshness is part of the capture");
        assert!(!store.contains(&absent), "created entry must be deleted");
    }

    #[test]
    fn test_cancelled_fetch_does_not_commit() {
        let store = CacheStore::new();
        let key = detail(1);
        store.set(&key, &"optimistic").unwrap();

        let guard = store.begin_fetch("igps");
        store.cancel_pending("igps");

        assert!(guard.is_cancelled());
        assert!(!guard.commit(&key, &"stale response").unwrap());
        assert_eq!(store.get_value(&key).unwrap(), serde_json::json!("optimistic"));
    }

    #[test]
    fn test_uncancelled_fetch_commits() {
        let store = CacheStore::new();
        let key = detail(1);
        let guard = store.begin_fetch("igps");
        assert!(guard.commit(&key, &"fetched").unwrap());
        assert_eq!(store.get_value(&key).unwrap(), serde_json::json!("fetched"));
    }

    #[test]
    fn test_cancel_is_scoped() {
        let store = CacheStore::new();
        let igp_guard = store.begin_fetch("igps");
        let violation_guard = store.begin_fetch("violations");

        store.cancel_pending("igps");

        assert!(igp_guard.is_cancelled());
        assert!(!violation_guard.is_cancelled());
    }
}
