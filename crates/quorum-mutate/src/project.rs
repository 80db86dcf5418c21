//! Optimistic projections.
//!
//! These helpers compute and apply the locally projected result of a
//! write before the server has confirmed it (protocol steps 3–4). They
//! edit whatever views are currently cached and leave everything else
//! alone; the settlement invalidation makes the server's answer
//! authoritative either way.
//!
//! Placement policy, kept as the dashboard ships it: a created row is
//! inserted visibly only on page 1 of a list (and only into the first
//! page of an infinite view) — every other page adjusts its counts
//! only, because the new row conceptually belongs on page 1.

use serde::de::DeserializeOwned;
use serde::Serialize;

use quorum_cache::{CacheStore, ViewKind};
use quorum_core::{Error, Page, Record, RecordId, Result};

use crate::views::ViewSet;

/// Edit the embedded row array of every parent aggregate in the view
/// set. Aggregate keys live in other scopes, so the scope loops below
/// never reach them; this applies the same row edit to their embedded
/// copies.
pub(crate) fn edit_aggregates<T, F>(store: &CacheStore, views: &ViewSet, edit: F) -> Result<()>
where
    T: Record + Serialize + DeserializeOwned,
    F: Fn(&mut Vec<T>) -> bool,
{
    for aggregate in views.aggregates() {
        let Some(mut value) = store.get_value(aggregate.key()) else {
            continue;
        };
        let Some(field) = value.get_mut(aggregate.embedded()) else {
            continue;
        };
        let mut rows: Vec<T> = serde_json::from_value(field.take()).map_err(Error::decode)?;
        if edit(&mut rows) {
            *field = serde_json::to_value(&rows).map_err(Error::encode)?;
            store.set_value(aggregate.key().clone(), value);
        }
    }
    Ok(())
}

/// Apply a create projection: the placeholder row lands on first pages,
/// other pages take the count bump.
pub fn project_create<T>(store: &CacheStore, views: &ViewSet, placeholder: &T) -> Result<()>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    for key in store.keys_in_scope(views.scope()) {
        match key.kind() {
            ViewKind::List { .. } => {
                if let Some(mut page) = store.get::<Page<T>>(&key)? {
                    if page.is_first() {
                        page.insert_first(placeholder.clone());
                    } else {
                        page.meta.add_item();
                    }
                    store.set(&key, &page)?;
                }
            }
            ViewKind::Infinite { .. } => {
                if let Some(mut pages) = store.get::<Vec<Page<T>>>(&key)? {
                    if let Some(first) = pages.first_mut() {
                        first.insert_first(placeholder.clone());
                        store.set(&key, &pages)?;
                    }
                }
            }
            // No detail entry exists for a row the server has not named.
            ViewKind::Detail { .. } => {}
        }
    }

    edit_aggregates(store, views, |rows: &mut Vec<T>| {
        rows.insert(0, placeholder.clone());
        true
    })
}

/// Apply an update projection: shallow-merge via the caller's `mutate`
/// closure onto the detail record and every cached list row with the
/// target id.
pub fn project_update<T>(
    store: &CacheStore,
    views: &ViewSet,
    id: RecordId,
    mutate: &dyn Fn(&mut T),
) -> Result<()>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    if let Some(detail) = views.detail() {
        if let Some(mut row) = store.get::<T>(detail)? {
            mutate(&mut row);
            store.set(detail, &row)?;
        }
    }

    for key in store.keys_in_scope(views.scope()) {
        match key.kind() {
            ViewKind::List { .. } => {
                if let Some(mut page) = store.get::<Page<T>>(&key)? {
                    if mutate_rows(&mut page, id, mutate) {
                        store.set(&key, &page)?;
                    }
                }
            }
            ViewKind::Infinite { .. } => {
                if let Some(mut pages) = store.get::<Vec<Page<T>>>(&key)? {
                    let mut changed = false;
                    for page in &mut pages {
                        changed |= mutate_rows(page, id, mutate);
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
                mutate(row);
                changed = true;
            }
        }
        changed
    })
}

/// Apply a delete projection: drop the row from every cached view and
/// remove the detail entry entirely.
pub fn project_delete<T>(store: &CacheStore, views: &ViewSet, id: RecordId) -> Result<()>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    for key in store.keys_in_scope(views.scope()) {
        match key.kind() {
            ViewKind::List { .. } => {
                if let Some(mut page) = store.get::<Page<T>>(&key)? {
                    if page.remove_where(|row| row.id() == id) > 0 {
                        store.set(&key, &page)?;
                    }
                }
            }
            ViewKind::Infinite { .. } => {
                if let Some(mut pages) = store.get::<Vec<Page<T>>>(&key)? {
                    let mut removed = 0;
                    for page in &mut pages {
                        removed += page.remove_where(|row| row.id() == id);
                    }
                    if removed > 0 {
                        store.set(&key, &pages)?;
                    }
                }
            }
            ViewKind::Detail { .. } => {}
        }
    }

    if let Some(detail) = views.detail() {
        store.remove(detail);
    }

    edit_aggregates(store, views, |rows: &mut Vec<T>| {
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        rows.len() != before
    })
}

fn mutate_rows<T: Record>(page: &mut Page<T>, id: RecordId, mutate: &dyn Fn(&mut T)) -> bool {
    let mut changed = false;
    for row in &mut page.data {
        if row.id() == id {
            mutate(row);
            changed = true;
        }
    }
    changed
}
