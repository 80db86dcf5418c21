//! Reconciliation with server-confirmed rows.
//!
//! After a successful write, the locally projected rows are replaced
//! with what the server actually stored (protocol step 6). Matching is
//! by the placeholder's temporary id for creates and by the confirmed
//! id otherwise.
//!
//! A successful create also strips any *other* placeholder rows left by
//! concurrent creates; their own mutations settle and refetch, and the
//! scope-wide invalidation that follows makes the server's ordering
//! authoritative.

use serde::de::DeserializeOwned;
use serde::Serialize;

use quorum_cache::{CacheKey, CacheStore, ViewKind};
use quorum_core::{Page, Record, RecordId, Result, TempId};

use crate::project::edit_aggregates;
use crate::views::ViewSet;

/// Reconcile a successful create: swap the placeholder for the server
/// row, strip stray placeholders, and seed the detail cache.
pub fn reconcile_created<T>(
    store: &CacheStore,
    views: &ViewSet,
    temp: Option<TempId>,
    confirmed: &T,
) -> Result<()>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    let matches = |row: &T| {
        temp.map(|t| row.id() == RecordId::Local(t)).unwrap_or(false)
            || row.id() == confirmed.id()
    };

    for key in store.keys_in_scope(views.scope()) {
        match key.kind() {
            ViewKind::List { .. } => {
                if let Some(mut page) = store.get::<Page<T>>(&key)? {
                    let replaced = page.replace_where(&matches, confirmed.clone());
                    let stripped = page.remove_where(|row| row.is_placeholder());
                    if replaced || stripped > 0 {
                        store.set(&key, &page)?;
                    }
                }
            }
            ViewKind::Infinite { .. } => {
                if let Some(mut pages) = store.get::<Vec<Page<T>>>(&key)? {
                    let mut changed = false;
                    for page in &mut pages {
                        changed |= page.replace_where(&matches, confirmed.clone());
                        changed |= page.remove_where(|row| row.is_placeholder()) > 0;
                    }
                    if changed {
                        store.set(&key, &pages)?;
                    }
                }
            }
            ViewKind::Detail { .. } => {}
        }
    }

    edit_aggregates(store, views, |rows: &mut Vec<T>| {
        let mut changed = false;
        for row in rows.iter_mut() {
            if matches(row) {
                *row = confirmed.clone();
                changed = true;
            }
        }
        let before = rows.len();
        rows.retain(|row| !row.is_placeholder());
        changed || rows.len() != before
    })?;

    // The server row now has a real id; seed its detail view.
    store.set(&CacheKey::detail(views.scope(), confirmed.id()), confirmed)?;
    Ok(())
}

/// Reconcile a successful update: the server row replaces the projected
/// row everywhere it appears, detail view included.
pub fn reconcile_updated<T>(store: &CacheStore, views: &ViewSet, confirmed: &T) -> Result<()>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    let id = confirmed.id();

    for key in store.keys_in_scope(views.scope()) {
        match key.kind() {
            ViewKind::List { .. } => {
                if let Some(mut page) = store.get::<Page<T>>(&key)? {
                    if page.replace_where(|row| row.id() == id, confirmed.clone()) {
                        store.set(&key, &page)?;
                    }
                }
            }
            ViewKind::Infinite { .. } => {
                if let Some(mut pages) = store.get::<Vec<Page<T>>>(&key)? {
                    let mut changed = false;
                    for page in &mut pages {
                        changed |= page.replace_where(|row| row.id() == id, confirmed.clone());
                    }
                    if changed {
                        store.set(&key, &pages)?;
                    }
                }
            }
            ViewKind::Detail { .. } => {}
        }
    }

    edit_aggregates(store, views, |rows: &mut Vec<T>| {
        let mut changed = false;
        for row in rows.iter_mut() {
            if row.id() == id {
                *row = confirmed.clone();
                changed = true;
            }
        }
        changed
    })?;

    let detail = views
        .detail()
        .cloned()
        .unwrap_or_else(|| CacheKey::detail(views.scope(), id));
    store.set(&detail, confirmed)?;
    Ok(())
}
