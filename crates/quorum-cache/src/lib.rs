//! Quorum Cache — the key-addressed client cache store.
//!
//! The cache is a process-wide key-value store of cached views: paginated
//! lists, infinite-scroll page sets, and single-item detail records. It is
//! never a source of truth — every entry is a read-through projection of
//! server state, reconciled or discarded by the optimistic mutation
//! engine.
//!
//! The store is an injected value (a cheap-clone handle), not a
//! module-level singleton, so tests construct isolated stores.
//!
//! # Modules
//!
//! - [`key`]: Hierarchical cache keys (scope + view discriminant)
//! - [`store`]: The store itself — entries, freshness, snapshots,
//!   in-flight fetch registration and cancellation

pub mod key;
pub mod store;

pub use key::{CacheKey, ViewKind};
pub use store::{CacheStore, Entry, FetchGuard, Freshness, Snapshot};
