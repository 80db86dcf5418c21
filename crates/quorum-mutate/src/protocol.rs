//! The optimistic mutation engine.
//!
//! [`OptimisticWrite`] runs the eight-step protocol once, generically,
//! for any entity implementing [`Record`]. The per-entity layer shrinks
//! to choosing a [`ViewSet`], building a placeholder or patch closure,
//! and handing over the transport future.
//!
//! Failure semantics: any rejection of the transport future — transport
//! failure, server-side validation, not-found — takes the same path:
//! restore the snapshots verbatim, notify, return the error. No retry
//! is attempted; the caller re-invokes the action. A mutation whose
//! request is already in flight cannot be cancelled.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use quorum_cache::CacheStore;
use quorum_core::{Record, RecordId};

use crate::error::{Error, Result};
use crate::views::ViewSet;
use crate::{project, reconcile};

/// User-facing error notification seam.
///
/// The engine reports every rejected write here after rolling back;
/// the dashboard shows a toast, tests capture the calls.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, scope: &str, message: &str);
}

/// Default notifier: reports through the `log` facade.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_error(&self, scope: &str, message: &str) {
        log::error!("mutation on '{scope}' failed: {message}");
    }
}

/// The optimistic mutation engine. Cheap to clone.
#[derive(Clone)]
pub struct OptimisticWrite {
    store: CacheStore,
    notifier: Arc<dyn Notifier>,
}

impl OptimisticWrite {
    /// Engine over the given store, reporting errors through
    /// [`LogNotifier`].
    pub fn new(store: CacheStore) -> Self {
        Self::with_notifier(store, Arc::new(LogNotifier))
    }

    /// Engine with a custom notification seam.
    pub fn with_notifier(store: CacheStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// The store this engine mutates.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Run an optimistic create.
    ///
    /// `placeholder` must carry a [`RecordId::Local`] id; it is projected
    /// into the affected views, then replaced by the row `request`
    /// resolves to.
    pub async fn create<T, F, E>(&self, views: &ViewSet, placeholder: T, request: F) -> Result<T>
    where
        T: Record + Serialize + DeserializeOwned + Clone,
        F: Future<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        let snapshot = self.prepare(views);
        let temp = placeholder.id().as_local();

        if let Err(err) = project::project_create(&self.store, views, &placeholder) {
            self.store.restore(snapshot);
            self.settle(views);
            return Err(err.into());
        }

        let outcome = match request.await {
            Ok(confirmed) => reconcile::reconcile_created(&self.store, views, temp, &confirmed)
                .map(|()| confirmed)
                .map_err(Error::from),
            Err(err) => Err(self.reject(views, snapshot, err)),
        };

        self.settle(views);
        outcome
    }

    /// Run an optimistic update.
    ///
    /// `apply` is the shallow-merge projection (typically
    /// `|row| patch.apply(row, now)`); `request` resolves to the
    /// server-confirmed row.
    pub async fn update<T, F, E>(
        &self,
        views: &ViewSet,
        id: RecordId,
        apply: impl Fn(&mut T),
        request: F,
    ) -> Result<T>
    where
        T: Record + Serialize + DeserializeOwned + Clone,
        F: Future<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        let snapshot = self.prepare(views);

        if let Err(err) = project::project_update(&self.store, views, id, &apply) {
            self.store.restore(snapshot);
            self.settle(views);
            return Err(err.into());
        }

        let outcome = match request.await {
            Ok(confirmed) => reconcile::reconcile_updated(&self.store, views, &confirmed)
                .map(|()| confirmed)
                .map_err(Error::from),
            Err(err) => Err(self.reject(views, snapshot, err)),
        };

        self.settle(views);
        outcome
    }

    /// Run an optimistic delete. `T` names the entity type so cached
    /// pages can be decoded.
    pub async fn delete<T, F, E>(&self, views: &ViewSet, id: RecordId, request: F) -> Result<()>
    where
        T: Record + Serialize + DeserializeOwned + Clone,
        F: Future<Output = std::result::Result<(), E>>,
        E: fmt::Display,
    {
        let snapshot = self.prepare(views);

        if let Err(err) = project::project_delete::<T>(&self.store, views, id) {
            self.store.restore(snapshot);
            self.settle(views);
            return Err(err.into());
        }

        let outcome = match request.await {
            // Nothing to reconcile: the rows are already gone.
            Ok(()) => Ok(()),
            Err(err) => Err(self.reject(views, snapshot, err)),
        };

        self.settle(views);
        outcome
    }

    /// Steps 1–2: cancel in-flight reads for every affected scope, then
    /// snapshot the affected views.
    fn prepare(&self, views: &ViewSet) -> quorum_cache::Snapshot {
        for scope in views.scopes() {
            self.store.cancel_pending(&scope);
        }
        let affected = views.resolve(&self.store);
        self.store.snapshot(&affected)
    }

    /// Step 7: rollback plus notification.
    fn reject<E: fmt::Display>(
        &self,
        views: &ViewSet,
        snapshot: quorum_cache::Snapshot,
        err: E,
    ) -> Error {
        self.store.restore(snapshot);
        let message = err.to_string();
        self.notifier.notify_error(views.scope(), &message);
        Error::rejected(views.scope(), message)
    }

    /// Step 8: unconditionally mark every affected view stale.
    fn settle(&self, views: &ViewSet) {
        self.store.invalidate_scope(views.scope());
        if let Some(detail) = views.detail() {
            self.store.invalidate(detail);
        }
        for aggregate in views.aggregates() {
            self.store.invalidate(aggregate.key());
        }
    }
}
